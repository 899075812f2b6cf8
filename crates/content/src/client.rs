//! Adapter contract
//!
//! `get_page` is the only required entry point. Everything else is an
//! optional capability: callers check `supports` first and degrade gracefully
//! (e.g. omit a vote button) when it is absent.

use crate::error::ContentError;
use crate::loader::LoaderRequest;
use crate::opaque::{ActTag, Opaque, ReplyTag, ReportTag};
use crate::page::Page2;
use crate::post::Body;
use crate::store::Page2Content;
use crate::Result;
use async_trait::async_trait;

/// Optional adapter capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Resolve a horizontal loader (replies, next page)
    LoadMore,
    /// Resolve a vertical loader (parent chain)
    LoadMoreUnmounted,
    Act,
    SendReply,
    PreviewReply,
    FetchReportScreen,
    SendReport,
    HydrateInbox,
    Login,
    GetLoginUrl,
    FetchRemoved,
}

/// A source adapter
#[async_trait]
pub trait Client: Send + Sync {
    /// Stable identifier, copied into every node this client produces
    fn id(&self) -> &str;

    /// Resolve a route into a content graph
    ///
    /// Never fails: network, parse and routing errors become a `Page2` whose
    /// pivot is an error post.
    async fn get_page(&self, path: &str) -> Page2;

    /// Capabilities this adapter implements
    fn capabilities(&self) -> &[Capability] {
        &[]
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Resolve a horizontal loader; the returned delta must fill its key
    async fn load_more(&self, _request: &LoaderRequest) -> Result<Page2Content> {
        Err(ContentError::Unsupported(Capability::LoadMore))
    }

    /// Resolve a vertical loader; the returned delta must fill its key
    async fn load_more_unmounted(&self, _request: &LoaderRequest) -> Result<Page2Content> {
        Err(ContentError::Unsupported(Capability::LoadMoreUnmounted))
    }

    async fn act(&self, _action: &Opaque<ActTag>) -> Result<()> {
        Err(ContentError::Unsupported(Capability::Act))
    }

    async fn send_reply(&self, _markdown: &str, _reply_info: &Opaque<ReplyTag>) -> Result<Page2> {
        Err(ContentError::Unsupported(Capability::SendReply))
    }

    async fn preview_reply(&self, _markdown: &str, _reply_info: &Opaque<ReplyTag>) -> Result<Body> {
        Err(ContentError::Unsupported(Capability::PreviewReply))
    }

    async fn fetch_report_screen(&self, _report: &Opaque<ReportTag>) -> Result<Body> {
        Err(ContentError::Unsupported(Capability::FetchReportScreen))
    }

    async fn send_report(&self, _report: &Opaque<ReportTag>, _reason: &str) -> Result<()> {
        Err(ContentError::Unsupported(Capability::SendReport))
    }

    async fn hydrate_inbox(&self) -> Result<Page2> {
        Err(ContentError::Unsupported(Capability::HydrateInbox))
    }

    async fn login(&self, _query: &str) -> Result<()> {
        Err(ContentError::Unsupported(Capability::Login))
    }

    async fn get_login_url(&self) -> Result<String> {
        Err(ContentError::Unsupported(Capability::GetLoginUrl))
    }

    async fn fetch_removed(&self, _request: &Opaque<ActTag>) -> Result<Body> {
        Err(ContentError::Unsupported(Capability::FetchRemoved))
    }
}
