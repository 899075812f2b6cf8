//! A resolved page: pivot link plus its content store

use crate::link::Link;
use crate::post::Post;
use crate::store::{Page2Content, ReadLink};

/// Result of `Client::get_page`
#[derive(Debug, Clone)]
pub struct Page2 {
    /// The node the UI centers on
    pub pivot: Link<Post>,
    pub content: Page2Content,
}

impl Page2 {
    /// Page whose pivot is a synthetic error post
    ///
    /// `get_page` returns this instead of failing, so callers never need to
    /// handle an error around it.
    pub fn from_error(client_id: &str, message: impl Into<String>, value: Option<String>) -> Self {
        let mut content = Page2Content::new();
        let pivot = Link::create("error pivot");
        content.fill_link(&pivot, Post::error(client_id, message, value));
        Self { pivot, content }
    }

    /// Read the pivot post
    pub fn pivot_post(&self) -> Option<ReadLink<'_, Post>> {
        self.content.read_link(&self.pivot)
    }
}
