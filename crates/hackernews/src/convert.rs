//! Upstream item to generic post content

use crate::router::Listing;
use crate::wire::{Item, ItemKind};
use content::post::{
    Action, Author, ClientContent, Collapsible, CounterAction, DefaultThumbnail, Flair,
    LegacyContent, PageContent, PostActions, PostInfo, SpecialContent, Thumbnail, VoteState,
};
use content::{Body, PostContent, PostContentPost};

/// Site the permalinks point to
pub const SITE: &str = "https://news.ycombinator.com";

/// Site path of an item; also its navigation url
pub fn item_path(id: u64) -> String {
    format!("/item?id={}", id)
}

/// Renderable content for an item
pub fn item_content(item: &Item) -> PostContent {
    if item.author.is_none() && item.text.is_none() && item.title.is_none() {
        return PostContent::Special(SpecialContent::Removed {
            reason: "[deleted]".to_string(),
        });
    }

    match item.kind {
        ItemKind::Story | ItemKind::Job | ItemKind::Poll => PostContent::Post(PostContentPost {
            title: item.title.clone(),
            flair: kind_flair(item.kind),
            thumbnail: Some(Thumbnail::Default(if item.url.is_some() {
                DefaultThumbnail::Link
            } else {
                DefaultThumbnail::SelfPost
            })),
            info: info(item),
            author: author(item),
            body: story_body(item),
            collapsible: Collapsible::Never,
            actions: actions(item),
        }),
        ItemKind::Comment => PostContent::Post(PostContentPost {
            title: None,
            flair: Vec::new(),
            thumbnail: None,
            info: info(item),
            author: author(item),
            body: html(item.text.as_deref()),
            collapsible: Collapsible::Collapsible {
                default_collapsed: false,
            },
            actions: actions(item),
        }),
        ItemKind::Pollopt => PostContent::Legacy(LegacyContent {
            title: None,
            info: info(item),
            body: html(item.text.as_deref()),
        }),
        ItemKind::Unknown => PostContent::Special(SpecialContent::Error {
            message: format!("Unsupported item type for item {}", item.id),
            value: Some(format!("{:?}", item)),
        }),
    }
}

/// Content of the synthetic listing root
pub fn header_content(listing: Listing, page: u32) -> PostContent {
    PostContent::Page(PageContent {
        title: if page == 0 {
            listing.title().to_string()
        } else {
            format!("{} (page {})", listing.title(), u64::from(page) + 1)
        },
        url: Some(format!("{}{}", SITE, listing.path(page))),
        body: Body::None,
    })
}

pub fn client_content(client_id: &str) -> PostContent {
    PostContent::Client(ClientContent {
        client_id: client_id.to_string(),
        title: "Hacker News".to_string(),
    })
}

fn kind_flair(kind: ItemKind) -> Vec<Flair> {
    let text = match kind {
        ItemKind::Job => "job",
        ItemKind::Poll => "poll",
        _ => return Vec::new(),
    };
    vec![Flair {
        text: text.to_string(),
        color: None,
    }]
}

fn info(item: &Item) -> PostInfo {
    PostInfo {
        creation_date: item.created_at_i.map(|secs| secs * 1000),
        edited_date: None,
        comments: match item.kind {
            ItemKind::Comment | ItemKind::Pollopt => None,
            _ => item.num_comments,
        },
        pinned: false,
    }
}

fn author(item: &Item) -> Option<Author> {
    item.author.as_ref().map(|name| Author {
        name: name.clone(),
        link: format!("/user?id={}", name),
        color_hash: name.clone(),
    })
}

fn html(text: Option<&str>) -> Body {
    match text {
        Some(html) if !html.is_empty() => Body::Html {
            html: html.to_string(),
        },
        _ => Body::None,
    }
}

fn story_body(item: &Item) -> Body {
    let link = item.url.as_ref().map(|url| Body::Link { url: url.clone() });
    match (link, html(item.text.as_deref())) {
        (Some(link), Body::None) => link,
        (Some(link), text) => Body::Array(vec![link, text]),
        (None, text) => text,
    }
}

fn actions(item: &Item) -> PostActions {
    PostActions {
        // Voting needs a session; the count is shown read-only
        vote: item.points.map(|points| CounterAction {
            count: Some(points),
            state: VoteState::None,
            increment: None,
            decrement: None,
        }),
        code: item.text.clone(),
        other: vec![Action::Link {
            url: format!("{}{}", SITE, item_path(item.id)),
            text: "Permalink".to_string(),
        }],
    }
}
