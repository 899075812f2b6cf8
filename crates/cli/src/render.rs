//! Plain-text rendering of thread rows
//!
//! Produces uncoloured `Line`s; the page command decides how each `Tone`
//! looks on the terminal.

use crate::util::{html_to_text, relative_time, truncate};
use chrono::{DateTime, Utc};
use content::post::{CounterAction, SpecialContent};
use content::richtext::to_plain_text;
use content::view::{PendingLoader, Row, RowKind};
use content::{Body, Link, Loader, Page2Content, Post, PostContent, ReadLink};

/// Longest headline before it is cut
const MAX_HEADLINE: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Context above the pivot
    Ancestor,
    Pivot,
    Reply,
    /// Something the user can act on (loaders, collapsed posts)
    Action,
    Muted,
    Error,
}

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub depth: usize,
    pub tone: Tone,
    pub headline: String,
    /// Score, author, age and comment count
    pub meta: Option<String>,
    pub body: Vec<String>,
}

impl Line {
    fn new(depth: usize, tone: Tone, headline: impl Into<String>) -> Self {
        Self {
            depth,
            tone,
            headline: headline.into(),
            meta: None,
            body: Vec::new(),
        }
    }
}

/// Render every row; bodies are included when `bodies` is set
pub fn render_rows(
    content: &Page2Content,
    rows: &[Row],
    now: DateTime<Utc>,
    bodies: bool,
) -> Vec<Line> {
    rows.iter()
        .map(|row| render_row(content, row, now, bodies))
        .collect()
}

pub fn render_row(content: &Page2Content, row: &Row, now: DateTime<Utc>, bodies: bool) -> Line {
    match &row.kind {
        RowKind::Ancestor(link) => post_line(content, link, row.depth, Tone::Ancestor, now, false),
        RowKind::Pivot(link) => post_line(content, link, row.depth, Tone::Pivot, now, bodies),
        RowKind::Reply(link) => post_line(content, link, row.depth, Tone::Reply, now, bodies),
        RowKind::Collapsed(link) => {
            let mut line = post_line(content, link, row.depth, Tone::Action, now, false);
            line.headline = format!("[+] {}", line.headline);
            line
        }
        RowKind::Loading(key) => Line::new(
            row.depth,
            Tone::Muted,
            format!("loading {}…", key.describe()),
        ),
        RowKind::Loader(loader) => Line::new(row.depth, Tone::Action, loader_label(loader)),
        RowKind::Error(message) => Line::new(row.depth, Tone::Error, format!("error: {}", message)),
        RowKind::Truncated { hidden } => Line::new(
            row.depth,
            Tone::Muted,
            format!(
                "{} more {} not shown",
                hidden,
                if *hidden == 1 { "reply" } else { "replies" }
            ),
        ),
    }
}

fn loader_label(loader: &PendingLoader) -> String {
    let what = match loader {
        PendingLoader::Vertical(_) => "load parent".to_string(),
        PendingLoader::Horizontal(h) => match h.base.load_count {
            Some(count) => format!("load {} more", count),
            None => "load more".to_string(),
        },
    };
    if loader.base().autoload {
        format!("{} (automatic)", what)
    } else {
        what
    }
}

fn post_line(
    content: &Page2Content,
    link: &Link<Post>,
    depth: usize,
    tone: Tone,
    now: DateTime<Utc>,
    bodies: bool,
) -> Line {
    let post = match content.read_link(link) {
        Some(ReadLink::Value(post)) => post,
        Some(ReadLink::Error(message)) => {
            return Line::new(depth, Tone::Error, format!("error: {}", message));
        }
        None => return Line::new(depth, Tone::Muted, format!("loading {}…", link.key().describe())),
    };

    let mut line = Line::new(depth, tone, headline(post));
    match &post.content {
        PostContent::Post(inner) => {
            line.meta = Some(meta(
                inner.actions.vote.as_ref(),
                inner.author.as_ref().map(|a| a.name.as_str()),
                inner.info.creation_date,
                inner.info.comments,
                now,
            ));
        }
        PostContent::Special(SpecialContent::Error { .. }) => line.tone = Tone::Error,
        _ => {}
    }

    if bodies {
        if let Some(body) = post.body() {
            line.body = body_text(body)
                .lines()
                .map(str::to_string)
                .collect();
        }
    }
    line
}

fn headline(post: &Post) -> String {
    let text = match &post.content {
        PostContent::Special(SpecialContent::Error { message, .. }) => format!("error: {}", message),
        PostContent::Special(SpecialContent::Removed { reason }) => format!("[removed: {}]", reason),
        PostContent::Client(client) => format!("{} ({})", client.title, client.client_id),
        _ => match post.title() {
            Some(title) => title.to_string(),
            None => post
                .body()
                .map(body_text)
                .and_then(|text| text.lines().next().map(str::to_string))
                .unwrap_or_else(|| "(untitled)".to_string()),
        },
    };
    truncate(&text, MAX_HEADLINE)
}

fn meta(
    vote: Option<&CounterAction>,
    author: Option<&str>,
    created_ms: Option<i64>,
    comments: Option<u32>,
    now: DateTime<Utc>,
) -> String {
    let mut parts = Vec::new();
    if let Some(count) = vote.and_then(|v| v.count) {
        parts.push(format!("{} {}", count, if count == 1 { "point" } else { "points" }));
    }
    if let Some(author) = author {
        parts.push(format!("by {}", author));
    }
    if let Some(ms) = created_ms {
        parts.push(relative_time(ms, now));
    }
    let mut meta = parts.join(" ");
    if let Some(comments) = comments {
        if !meta.is_empty() {
            meta.push_str(" | ");
        }
        meta.push_str(&format!(
            "{} {}",
            comments,
            if comments == 1 { "comment" } else { "comments" }
        ));
    }
    meta
}

/// Terminal text for a body
pub fn body_text(body: &Body) -> String {
    match body {
        Body::None => String::new(),
        Body::Text { content } => content.clone(),
        Body::RichText(text) => to_plain_text(text),
        Body::Html { html } => html_to_text(html),
        Body::Link { url } => url.clone(),
        Body::Image(image) => format!("[image] {}", image.url),
        Body::Video { url, .. } => format!("[video] {}", url),
        Body::Gallery { images } => format!("[gallery of {}]", images.len()),
        Body::Poll { choices, .. } => choices
            .iter()
            .map(|choice| match choice.votes {
                Some(votes) => format!("- {} ({})", choice.text, votes),
                None => format!("- {}", choice.text),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Body::Array(parts) => parts
            .iter()
            .map(body_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        Body::Crosspost(link) => format!("[crosspost] {}", link.key().describe()),
        Body::Error { message, .. } => format!("error: {}", message),
    }
}
