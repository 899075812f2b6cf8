//! Generic post schema
//!
//! The closed vocabulary every adapter targets. Rendering code matches on
//! these enums exhaustively; adding a variant is a compile error everywhere
//! it is consumed.

use crate::link::Link;
use crate::loader::{HorizontalLoader, VerticalLoader};
use crate::opaque::{ActTag, Opaque, ReplyTag, ReportTag};
use crate::richtext::{self, RichText};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A node in the content tree
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub content: PostContent,
    /// Adapter-private payload; the UI never inspects it
    pub internal_data: InternalData,
    pub parent: Option<PostParent>,
    pub replies: Option<PostReplies>,
    /// `None` means this node cannot become the navigation pivot
    pub url: Option<String>,
    pub client_id: String,
}

/// Up edge, resolved through a loader since the parent may not be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct PostParent {
    pub loader: VerticalLoader,
}

/// Down edge
#[derive(Debug, Clone, PartialEq)]
pub struct PostReplies {
    pub display: RepliesDisplay,
    pub loader: HorizontalLoader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepliesDisplay {
    /// Nested comment tree
    Tree,
    /// Flat listing (e.g. stories on a front page)
    Repivot,
}

/// Opaque per-adapter data attached to a post
#[derive(Clone, Default)]
pub struct InternalData(Option<Arc<dyn Any + Send + Sync>>);

impl InternalData {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Some(Arc::new(data)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    /// For the issuing adapter only
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref::<T>()
    }
}

impl PartialEq for InternalData {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for InternalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("InternalData(..)"),
            None => f.write_str("InternalData(None)"),
        }
    }
}

/// Renderable payload of a post
#[derive(Debug, Clone, PartialEq)]
pub enum PostContent {
    /// Identifies the source client; sits above every listing
    Client(ClientContent),
    /// Wrapper for a listing page (front page, search results)
    Page(PageContent),
    /// The common case
    Post(PostContentPost),
    /// Pre-formatted content from older adapters
    Legacy(LegacyContent),
    /// Content the adapter can only describe, not render structurally
    Special(SpecialContent),
    /// A form that submits new content
    Submit(SubmitContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientContent {
    pub client_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub title: String,
    pub url: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostContentPost {
    pub title: Option<String>,
    pub flair: Vec<Flair>,
    pub thumbnail: Option<Thumbnail>,
    pub info: PostInfo,
    pub author: Option<Author>,
    pub body: Body,
    pub collapsible: Collapsible,
    pub actions: PostActions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyContent {
    pub title: Option<String>,
    pub info: PostInfo,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecialContent {
    /// A node that failed to resolve; `value` is the offending payload
    Error { message: String, value: Option<String> },
    /// Deleted or removed content
    Removed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitContent {
    pub title: String,
    pub fields: Vec<SubmitField>,
    pub submit: Opaque<ReplyTag>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitField {
    Title { id: String },
    Text { id: String, placeholder: String },
    Link { id: String },
}

/// Timestamps and counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostInfo {
    /// Unix milliseconds
    pub creation_date: Option<i64>,
    pub edited_date: Option<i64>,
    pub comments: Option<u32>,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub link: String,
    /// Stable seed for the author's colour
    pub color_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flair {
    pub text: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Thumbnail {
    Image { url: String },
    Default(DefaultThumbnail),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultThumbnail {
    SelfPost,
    Link,
    Image,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsible {
    Collapsible { default_collapsed: bool },
    Never,
}

/// Actions bag of a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostActions {
    pub vote: Option<CounterAction>,
    /// Raw source view
    pub code: Option<String>,
    pub other: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Link { url: String, text: String },
    Counter(CounterAction),
    Reply { text: String, reply_info: Opaque<ReplyTag> },
    Report { data: Opaque<ReportTag> },
    Act { text: String, action: Opaque<ActTag> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterAction {
    /// `None` when the count is hidden
    pub count: Option<i64>,
    pub state: VoteState,
    /// Absent when the adapter cannot vote (e.g. logged out)
    pub increment: Option<Opaque<ActTag>>,
    pub decrement: Option<Opaque<ActTag>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    None,
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub caption: Option<String>,
}

/// Renderable body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    None,
    Text { content: String },
    RichText(RichText),
    /// Source-provided HTML; rendered by an external collaborator
    Html { html: String },
    Link { url: String },
    Image(GalleryImage),
    Video { url: String, gifv: bool },
    Gallery { images: Vec<GalleryImage> },
    Poll { choices: Vec<PollChoice>, total_votes: Option<i64> },
    Array(Vec<Body>),
    /// Another post embedded in this one
    Crosspost(Link<Post>),
    Error { message: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollChoice {
    pub text: String,
    pub votes: Option<i64>,
}

impl Post {
    /// Synthetic node standing in for a failed resolution
    pub fn error(client_id: &str, message: impl Into<String>, value: Option<String>) -> Self {
        Self {
            content: PostContent::Special(SpecialContent::Error {
                message: message.into(),
                value,
            }),
            internal_data: InternalData::none(),
            parent: None,
            replies: None,
            url: None,
            client_id: client_id.to_string(),
        }
    }

    /// Title shown for this post, if it has one
    pub fn title(&self) -> Option<&str> {
        match &self.content {
            PostContent::Client(client) => Some(&client.title),
            PostContent::Page(page) => Some(&page.title),
            PostContent::Post(post) => post.title.as_deref(),
            PostContent::Legacy(legacy) => legacy.title.as_deref(),
            PostContent::Special(_) => None,
            PostContent::Submit(submit) => Some(&submit.title),
        }
    }

    pub fn body(&self) -> Option<&Body> {
        match &self.content {
            PostContent::Page(page) => Some(&page.body),
            PostContent::Post(post) => Some(&post.body),
            PostContent::Legacy(legacy) => Some(&legacy.body),
            PostContent::Client(_) | PostContent::Special(_) | PostContent::Submit(_) => None,
        }
    }
}

impl Body {
    /// Body for a plain-text message
    pub fn plain(text: &str) -> Self {
        Body::RichText(richtext::plain(text))
    }
}
