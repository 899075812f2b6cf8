//! Upstream wire types (Algolia Hacker News API)
//!
//! Only the fields the adapter reads are modelled; everything else is
//! ignored during deserialization.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Item as returned by `/api/v1/items/{id}`, with its full reply tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(default)]
    pub created_at_i: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// HTML body
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub story_id: Option<u64>,
    /// Only present on search hits
    #[serde(default)]
    pub num_comments: Option<u32>,
    #[serde(default)]
    pub children: Vec<Item>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    Pollopt,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Item {
    /// Copy without the reply tree
    pub fn shallow(&self) -> Item {
        Item {
            id: self.id,
            created_at_i: self.created_at_i,
            kind: self.kind,
            author: self.author.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            text: self.text.clone(),
            points: self.points,
            parent_id: self.parent_id,
            story_id: self.story_id,
            num_comments: self.num_comments,
            children: Vec::new(),
        }
    }

    /// Number of items below this one
    pub fn descendants(&self) -> u32 {
        let mut count = 0u32;
        let mut pending: Vec<&Item> = self.children.iter().collect();
        while let Some(item) = pending.pop() {
            count = count.saturating_add(1);
            pending.extend(item.children.iter());
        }
        count
    }
}

impl Drop for Item {
    // Reply chains can be thousands deep; unlink them instead of recursing
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut item) = pending.pop() {
            pending.append(&mut item.children);
        }
    }
}

/// Parse an upstream body without a nesting limit
///
/// Item trees nest two JSON levels per reply, so serde_json's default limit
/// would reject threads a few dozen replies deep. The stack grows on demand
/// instead.
pub fn from_str<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_str(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// `/api/v1/search` and `/api/v1/search_by_date` response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub page: u32,
    #[serde(rename = "nbPages", default)]
    pub nb_pages: u32,
}

impl SearchResponse {
    /// Whether a page after this one exists
    pub fn has_more(&self) -> bool {
        self.page
            .checked_add(1)
            .is_some_and(|next| next < self.nb_pages)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub created_at_i: Option<i64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub story_text: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub num_comments: Option<u32>,
}

impl Hit {
    /// Story item for a listing entry; `None` if the object id is not numeric
    pub fn into_item(self) -> Option<Item> {
        let id = self.object_id.parse().ok()?;
        Some(Item {
            id,
            created_at_i: self.created_at_i,
            kind: ItemKind::Story,
            author: self.author,
            title: self.title,
            url: self.url,
            text: self.story_text,
            points: self.points,
            parent_id: None,
            story_id: None,
            num_comments: self.num_comments,
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tree_deserializes() {
        let json = r#"{
            "id": 1, "type": "story", "title": "Hello", "author": "pg",
            "created_at_i": 1700000000, "points": 3, "extra": true,
            "children": [
                {"id": 2, "type": "comment", "text": "<p>hi</p>", "parent_id": 1,
                 "children": [{"id": 3, "type": "comment", "parent_id": 2, "children": []}]}
            ]
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Story);
        assert_eq!(item.descendants(), 2);

        let shallow = item.shallow();
        assert!(shallow.children.is_empty());
        assert_eq!(shallow.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_unknown_kind_is_tolerated() {
        let item: Item = serde_json::from_str(r#"{"id": 9, "type": "moderation"}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Unknown);
    }

    #[test]
    fn test_hit_with_bad_object_id_is_dropped() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"hits": [{"objectID": "12", "title": "a"}, {"objectID": "x"}], "page": 0, "nbPages": 2}"#,
        )
        .unwrap();
        assert!(response.has_more());
        let items: Vec<Item> = response.hits.into_iter().filter_map(Hit::into_item).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 12);
    }

    #[test]
    fn test_deep_reply_chain_parses() {
        const DEPTH: usize = 5000;
        let mut json = String::new();
        for id in 1..=DEPTH {
            json.push_str(&format!(r#"{{"id": {}, "type": "comment", "children": ["#, id));
        }
        json.push_str(&"]}".repeat(DEPTH));

        let item: Item = from_str(&json).unwrap();
        assert_eq!(item.descendants() as usize, DEPTH - 1);
        assert!(serde_json::from_str::<Item>(&json).is_err());
    }

    #[test]
    fn test_last_page_number_has_no_more() {
        let response: SearchResponse =
            from_str(r#"{"hits": [], "page": 4294967295, "nbPages": 4294967295}"#).unwrap();
        assert!(!response.has_more());
    }
}
