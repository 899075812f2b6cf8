//! Shared fixtures for adapter integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use hackernews::{AdapterError, Fetch, HackerNewsClient, HackerNewsConfig, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Serves canned bodies keyed by path, plus `#page` for search requests
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, id: u64, body: &str) -> Self {
        self.bodies.insert(format!("/api/v1/items/{}", id), body.to_string());
        self
    }

    pub fn search(mut self, endpoint: &str, page: u32, body: &str) -> Self {
        self.bodies
            .insert(format!("/api/v1/{}#{}", endpoint, page), body.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn key(url: &Url) -> String {
        match url.query_pairs().find(|(k, _)| k == "page") {
            Some((_, page)) => format!("{}#{}", url.path(), page),
            None => url.path().to_string(),
        }
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn get(&self, url: &Url) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(&Self::key(url))
            .cloned()
            .ok_or_else(|| AdapterError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub fn client(fetcher: StaticFetcher) -> Arc<HackerNewsClient<StaticFetcher>> {
    Arc::new(HackerNewsClient::with_fetcher(HackerNewsConfig::default(), fetcher).unwrap())
}

/// Story 1 with comments 2 -> 3 and 4
pub const STORY: &str = r#"{
    "id": 1, "type": "story", "title": "A story", "author": "alice",
    "url": "https://example.com", "points": 42, "created_at_i": 1700000000,
    "children": [
        {"id": 2, "type": "comment", "author": "bob", "text": "<p>first</p>", "parent_id": 1,
         "children": [
            {"id": 3, "type": "comment", "author": "carol", "text": "<p>nested</p>", "parent_id": 2, "children": []}
         ]},
        {"id": 4, "type": "comment", "author": "dave", "text": "<p>second</p>", "parent_id": 1, "children": []}
    ]
}"#;

/// Comment 2 on its own, as fetched by `/item?id=2`
pub const COMMENT: &str = r#"{
    "id": 2, "type": "comment", "author": "bob", "text": "<p>first</p>", "parent_id": 1,
    "children": [
        {"id": 3, "type": "comment", "author": "carol", "text": "<p>nested</p>", "parent_id": 2, "children": []}
    ]
}"#;

pub const FRONT_PAGE_0: &str = r#"{
    "hits": [
        {"objectID": "1", "title": "A story", "author": "alice", "points": 42, "num_comments": 3},
        {"objectID": "10", "title": "Another", "author": "erin", "points": 7, "num_comments": 0}
    ],
    "page": 0, "nbPages": 2
}"#;

pub const FRONT_PAGE_1: &str = r#"{
    "hits": [
        {"objectID": "20", "title": "Older", "author": "frank", "points": 1, "num_comments": 0}
    ],
    "page": 1, "nbPages": 2
}"#;
