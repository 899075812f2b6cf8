//! Thread presentation
//!
//! Flattens a resolved graph into display rows. The graph is never mutated:
//! threading (keeping a lone reply at its parent's depth) and collapsing are
//! decided here, keyed by link so they survive content updates.

use crate::link::{Link, LinkKey};
use crate::loader::{
    BaseLoader, Direction, HorizontalItem, HorizontalLoader, Loader, LoaderState, VerticalLoader,
};
use crate::post::Post;
use crate::store::{Page2Content, ReadLink};
use ahash::AHashSet;
use smallvec::SmallVec;

/// Stack left before reply recursion moves to a fresh segment
const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Per-view UI state that must outlive content updates
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    collapsed: AHashSet<LinkKey>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the collapsed flag of a post; returns the new value
    pub fn toggle(&mut self, post: &Link<Post>) -> bool {
        if self.collapsed.remove(post.key()) {
            false
        } else {
            self.collapsed.insert(post.key().clone());
            true
        }
    }

    pub fn is_collapsed(&self, post: &Link<Post>) -> bool {
        self.collapsed.contains(post.key())
    }
}

/// Flattening options
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    /// Replies deeper than this are summarised by a `Truncated` row
    pub max_depth: usize,
    /// Keep a post's only reply at the same depth instead of indenting it
    pub thread_single_replies: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            thread_single_replies: true,
        }
    }
}

/// A loader found while walking, in either direction
#[derive(Debug, Clone, PartialEq)]
pub enum PendingLoader {
    Vertical(VerticalLoader),
    Horizontal(HorizontalLoader),
}

impl Loader for PendingLoader {
    fn base(&self) -> &BaseLoader {
        match self {
            PendingLoader::Vertical(loader) => &loader.base,
            PendingLoader::Horizontal(loader) => &loader.base,
        }
    }

    fn key(&self) -> &LinkKey {
        match self {
            PendingLoader::Vertical(loader) => loader.key.key(),
            PendingLoader::Horizontal(loader) => loader.key.key(),
        }
    }

    fn direction(&self) -> Direction {
        match self {
            PendingLoader::Vertical(_) => Direction::Vertical,
            PendingLoader::Horizontal(_) => Direction::Horizontal,
        }
    }
}

/// What a row shows
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Ancestor of the pivot, outermost first
    Ancestor(Link<Post>),
    Pivot(Link<Post>),
    Reply(Link<Post>),
    /// Collapsed post; its replies are hidden
    Collapsed(Link<Post>),
    /// A link that has not resolved yet
    Loading(LinkKey),
    /// Unresolved edge the UI may dispatch
    Loader(PendingLoader),
    /// Terminal resolution error, rendered inline
    Error(String),
    /// Replies cut off by `max_depth`
    Truncated { hidden: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub depth: usize,
    pub kind: RowKind,
}

/// Walk ancestors, the pivot and its replies into display rows
pub fn flatten(
    content: &Page2Content,
    pivot: &Link<Post>,
    state: &ViewState,
    options: ViewOptions,
) -> Vec<Row> {
    let mut rows = ancestors(content, pivot);

    match content.read_link(pivot) {
        None => rows.push(row(0, RowKind::Loading(pivot.key().clone()))),
        Some(ReadLink::Error(message)) => rows.push(row(0, RowKind::Error(message.to_string()))),
        Some(ReadLink::Value(post)) => {
            rows.push(row(0, RowKind::Pivot(pivot.clone())));
            if let Some(replies) = &post.replies {
                let mut visiting = AHashSet::new();
                visiting.insert(pivot.key().clone());
                walk_replies(content, &replies.loader, 1, state, options, &mut visiting, &mut rows);
            }
        }
    }

    rows
}

/// Loaders in `rows` that the UI should fire without a gesture
pub fn autoload_loaders(rows: &[Row]) -> Vec<&PendingLoader> {
    rows.iter()
        .filter_map(|row| match &row.kind {
            RowKind::Loader(loader) if loader.base().autoload => Some(loader),
            _ => None,
        })
        .collect()
}

fn row(depth: usize, kind: RowKind) -> Row {
    Row { depth, kind }
}

fn ancestors(content: &Page2Content, pivot: &Link<Post>) -> Vec<Row> {
    let mut chain: Vec<Row> = Vec::new();
    let mut seen = AHashSet::new();
    let mut current = pivot.clone();

    loop {
        if !seen.insert(current.key().clone()) {
            chain.push(row(0, RowKind::Error("parent chain loops".to_string())));
            break;
        }
        let Some(ReadLink::Value(post)) = content.read_link(&current) else {
            break;
        };
        let Some(parent) = &post.parent else {
            break;
        };
        let loader = &parent.loader;
        match content.read_link(&loader.key) {
            None => {
                chain.push(row(0, RowKind::Loader(PendingLoader::Vertical(loader.clone()))));
                break;
            }
            Some(ReadLink::Error(message)) => {
                chain.push(row(0, RowKind::Error(message.to_string())));
                break;
            }
            Some(ReadLink::Value(None)) => break,
            Some(ReadLink::Value(Some(link))) => {
                chain.push(row(0, RowKind::Ancestor(link.clone())));
                current = link.clone();
            }
        }
    }

    chain.reverse();
    chain
}

fn walk_replies(
    content: &Page2Content,
    loader: &HorizontalLoader,
    depth: usize,
    state: &ViewState,
    options: ViewOptions,
    visiting: &mut AHashSet<LinkKey>,
    rows: &mut Vec<Row>,
) {
    let items = match content.read_link(&loader.key) {
        None => {
            rows.push(row(depth, RowKind::Loader(PendingLoader::Horizontal(loader.clone()))));
            return;
        }
        Some(ReadLink::Error(message)) => {
            rows.push(row(depth, RowKind::Error(message.to_string())));
            return;
        }
        Some(ReadLink::Value(items)) => items,
    };

    if depth > options.max_depth {
        if !items.is_empty() {
            rows.push(row(depth, RowKind::Truncated { hidden: items.len() }));
        }
        return;
    }

    let single = items.len() == 1;
    for item in items {
        match item {
            HorizontalItem::Loader(next) => match next.state(content) {
                LoaderState::Unfilled => {
                    rows.push(row(depth, RowKind::Loader(PendingLoader::Horizontal(next.clone()))))
                }
                _ => walk_replies(content, next, depth, state, options, visiting, rows),
            },
            HorizontalItem::Post(link) => {
                walk_post(content, link, depth, single, state, options, visiting, rows)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_post(
    content: &Page2Content,
    link: &Link<Post>,
    depth: usize,
    only_child: bool,
    state: &ViewState,
    options: ViewOptions,
    visiting: &mut AHashSet<LinkKey>,
    rows: &mut Vec<Row>,
) {
    let post = match content.read_link(link) {
        None => {
            rows.push(row(depth, RowKind::Loading(link.key().clone())));
            return;
        }
        Some(ReadLink::Error(message)) => {
            rows.push(row(depth, RowKind::Error(message.to_string())));
            return;
        }
        Some(ReadLink::Value(post)) => post,
    };

    if !visiting.insert(link.key().clone()) {
        rows.push(row(depth, RowKind::Error("reply graph loops".to_string())));
        return;
    }

    if state.is_collapsed(link) {
        rows.push(row(depth, RowKind::Collapsed(link.clone())));
    } else {
        rows.push(row(depth, RowKind::Reply(link.clone())));
        if let Some(replies) = &post.replies {
            let threaded = options.thread_single_replies
                && only_child
                && has_single_reply(content, &replies.loader);
            let child_depth = if threaded {
                depth
            } else {
                depth + 1
            };
            stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
                walk_replies(content, &replies.loader, child_depth, state, options, visiting, rows)
            });
        }
    }

    visiting.remove(link.key());
}

fn has_single_reply(content: &Page2Content, loader: &HorizontalLoader) -> bool {
    let posts: SmallVec<[&Link<Post>; 2]> = match content.read_link(&loader.key) {
        Some(ReadLink::Value(items)) => items
            .iter()
            .filter_map(|item| match item {
                HorizontalItem::Post(link) => Some(link),
                HorizontalItem::Loader(_) => None,
            })
            .take(2)
            .collect(),
        _ => return false,
    };
    posts.len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{
        ClientContent, InternalData, PostContent, PostParent, PostReplies, RepliesDisplay,
    };

    fn node(
        content: &mut Page2Content,
        link: &Link<Post>,
        parent: Option<Link<Post>>,
        replies: Vec<HorizontalItem>,
    ) {
        let parent = PostParent {
            loader: VerticalLoader::prefilled(content, "test", parent),
        };
        let replies = PostReplies {
            display: RepliesDisplay::Tree,
            loader: HorizontalLoader::prefilled(content, "test", replies),
        };
        let post = Post {
            content: PostContent::Client(ClientContent {
                client_id: "test".into(),
                title: format!("{:?}", link),
            }),
            internal_data: InternalData::none(),
            parent: Some(parent),
            replies: Some(replies),
            url: None,
            client_id: "test".into(),
        };
        content.fill_link(link, post);
    }

    fn kinds(rows: &[Row]) -> Vec<(usize, &'static str)> {
        rows.iter()
            .map(|r| {
                let name = match r.kind {
                    RowKind::Ancestor(_) => "ancestor",
                    RowKind::Pivot(_) => "pivot",
                    RowKind::Reply(_) => "reply",
                    RowKind::Collapsed(_) => "collapsed",
                    RowKind::Loading(_) => "loading",
                    RowKind::Loader(_) => "loader",
                    RowKind::Error(_) => "error",
                    RowKind::Truncated { .. } => "truncated",
                };
                (r.depth, name)
            })
            .collect()
    }

    #[test]
    fn test_flatten_tree_with_ancestor() {
        let mut content = Page2Content::new();
        let root = Link::create("root");
        let pivot = Link::create("pivot");
        let a = Link::create("a");
        let b = Link::create("b");
        node(&mut content, &root, None, vec![HorizontalItem::Post(pivot.clone())]);
        node(
            &mut content,
            &pivot,
            Some(root.clone()),
            vec![HorizontalItem::Post(a.clone()), HorizontalItem::Post(b.clone())],
        );
        node(&mut content, &a, Some(pivot.clone()), vec![]);
        node(&mut content, &b, Some(pivot.clone()), vec![]);

        let rows = flatten(&content, &pivot, &ViewState::new(), ViewOptions::default());
        assert_eq!(
            kinds(&rows),
            vec![(0, "ancestor"), (0, "pivot"), (1, "reply"), (1, "reply")]
        );
    }

    #[test]
    fn test_single_reply_chain_is_threaded() {
        let mut content = Page2Content::new();
        let pivot = Link::create("pivot");
        let a = Link::create("a");
        let b = Link::create("b");
        node(&mut content, &pivot, None, vec![HorizontalItem::Post(a.clone())]);
        node(&mut content, &a, Some(pivot.clone()), vec![HorizontalItem::Post(b.clone())]);
        node(&mut content, &b, Some(a.clone()), vec![]);

        let threaded = flatten(&content, &pivot, &ViewState::new(), ViewOptions::default());
        assert_eq!(kinds(&threaded), vec![(0, "pivot"), (1, "reply"), (1, "reply")]);

        let nested = ViewOptions {
            thread_single_replies: false,
            ..ViewOptions::default()
        };
        let rows = flatten(&content, &pivot, &ViewState::new(), nested);
        assert_eq!(kinds(&rows), vec![(0, "pivot"), (1, "reply"), (2, "reply")]);
    }

    #[test]
    fn test_collapse_survives_reflatten() {
        let mut content = Page2Content::new();
        let pivot = Link::create("pivot");
        let a = Link::create("a");
        let b = Link::create("b");
        node(&mut content, &pivot, None, vec![HorizontalItem::Post(a.clone())]);
        node(&mut content, &a, Some(pivot.clone()), vec![HorizontalItem::Post(b.clone())]);
        node(&mut content, &b, Some(a.clone()), vec![]);

        let mut state = ViewState::new();
        assert!(state.toggle(&a));

        let rows = flatten(&content, &pivot, &state, ViewOptions::default());
        assert_eq!(kinds(&rows), vec![(0, "pivot"), (1, "collapsed")]);

        // New content for an unrelated link does not reset collapsed state
        content.fill_link(&Link::<u32>::create("unrelated"), 1);
        let rows = flatten(&content, &pivot, &state, ViewOptions::default());
        assert_eq!(kinds(&rows), vec![(0, "pivot"), (1, "collapsed")]);
    }

    #[test]
    fn test_unresolved_and_failed_edges_render_inline() {
        let mut content = Page2Content::new();
        let pivot = Link::create("pivot");
        let missing = content.create_link_to_error("item=9 not found");
        let pending = HorizontalLoader {
            base: BaseLoader {
                load_count: Some(3),
                request: Link::create("request"),
                client_id: "test".into(),
                autoload: true,
            },
            key: Link::create("more"),
        };
        node(
            &mut content,
            &pivot,
            None,
            vec![HorizontalItem::Post(missing), HorizontalItem::Loader(pending)],
        );

        let rows = flatten(&content, &pivot, &ViewState::new(), ViewOptions::default());
        assert_eq!(kinds(&rows), vec![(0, "pivot"), (1, "error"), (1, "loader")]);
        assert_eq!(autoload_loaders(&rows).len(), 1);
    }

    #[test]
    fn test_depth_limit_truncates() {
        let mut content = Page2Content::new();
        let pivot = Link::create("pivot");
        let a = Link::create("a");
        let b = Link::create("b");
        node(&mut content, &pivot, None, vec![HorizontalItem::Post(a.clone())]);
        node(&mut content, &a, Some(pivot.clone()), vec![HorizontalItem::Post(b.clone())]);
        node(&mut content, &b, Some(a.clone()), vec![]);

        let options = ViewOptions {
            max_depth: 1,
            thread_single_replies: false,
        };
        let rows = flatten(&content, &pivot, &ViewState::new(), options);
        assert_eq!(kinds(&rows), vec![(0, "pivot"), (1, "reply"), (2, "truncated")]);
    }
}
