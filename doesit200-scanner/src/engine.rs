use crate::error::Result;
use async_trait::async_trait;

/// An anchor element as read from the rendered DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// `Ok(None)` when the element has no `href`, `Err` when the attribute
    /// could not be read.
    pub href: std::result::Result<Option<String>, String>,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Ok(Some(href.into())),
        }
    }

    pub fn without_href() -> Self {
        Self { href: Ok(None) }
    }

    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            href: Err(reason.into()),
        }
    }
}

/// A single browser page the crawler drives. Network traffic is reported
/// out of band through the `NetworkEventSink` the engine was built with.
#[async_trait]
pub trait PageEngine: Send {
    /// Navigate and wait for the load to settle.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Every `<a>` element of the current document, in DOM order.
    async fn anchors(&mut self) -> Result<Vec<Anchor>>;

    /// URL of the current document after redirects.
    async fn current_url(&mut self) -> Result<String>;

    /// `window.location.origin` of the current document.
    async fn evaluate_origin(&mut self) -> Result<String>;
}
