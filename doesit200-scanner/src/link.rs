//! Turns raw anchor `href` values into canonical absolute URLs.
//!
//! Root-relative links are resolved against the page origin reported by the
//! browser, document-relative links against the full page URL. Pseudo-scheme
//! and fragment-only links are rejected.

use std::fmt;
use url::Url;

const NON_NAVIGABLE_PREFIXES: [&str; 3] = ["tel:", "mailto:", "javascript:"];

/// Why an `href` did not produce a crawlable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRejection {
    Empty,
    /// `tel:`, `mailto:`, `javascript:` or a `#fragment`.
    NonNavigable(&'static str),
    OriginUnavailable(String),
    Unresolvable(String),
    UnsupportedScheme(String),
}

impl LinkRejection {
    /// Recoverable problems worth a warning, as opposed to link kinds that
    /// are skipped on purpose.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            LinkRejection::OriginUnavailable(_) | LinkRejection::Unresolvable(_)
        )
    }
}

impl fmt::Display for LinkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRejection::Empty => write!(f, "empty href"),
            LinkRejection::NonNavigable(kind) => write!(f, "non-navigable {} link", kind),
            LinkRejection::OriginUnavailable(reason) => {
                write!(f, "page origin unavailable: {}", reason)
            }
            LinkRejection::Unresolvable(reason) => write!(f, "cannot resolve href: {}", reason),
            LinkRejection::UnsupportedScheme(scheme) => {
                write!(f, "unsupported scheme '{}'", scheme)
            }
        }
    }
}

/// Page origin as reported by the rendering engine, or why it is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Known(String),
    Unavailable(String),
}

impl Origin {
    /// Opaque documents (`about:blank`, sandboxed frames) report `"null"`.
    pub fn from_evaluated(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "null" {
            Origin::Unavailable(format!("engine reported origin '{}'", value))
        } else {
            Origin::Known(value.trim_end_matches('/').to_string())
        }
    }
}

/// True for `/path` links, which need the page origin. `//host/path` is
/// scheme-relative and resolves against the page URL instead.
pub fn is_root_relative(href: &str) -> bool {
    let href = href.trim();
    href.starts_with('/') && !href.starts_with("//")
}

fn non_navigable_kind(href: &str) -> Option<&'static str> {
    if href.starts_with('#') {
        return Some("fragment");
    }
    NON_NAVIGABLE_PREFIXES
        .iter()
        .find(|prefix| {
            href.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map(|prefix| prefix.trim_end_matches(':'))
}

/// Normalize one `href`.
///
/// `origin` is only consulted for root-relative links; pass `None` when it
/// was never evaluated.
pub fn normalize_href(
    href: &str,
    page_url: Option<&Url>,
    origin: Option<&Origin>,
) -> Result<String, LinkRejection> {
    let href = href.trim();
    if href.is_empty() {
        return Err(LinkRejection::Empty);
    }
    if let Some(kind) = non_navigable_kind(href) {
        return Err(LinkRejection::NonNavigable(kind));
    }

    let resolved = if is_root_relative(href) {
        match origin {
            Some(Origin::Known(origin)) => Url::parse(&format!("{}{}", origin, href))
                .map_err(|e| LinkRejection::Unresolvable(format!("{}{}: {}", origin, href, e)))?,
            Some(Origin::Unavailable(reason)) => {
                return Err(LinkRejection::OriginUnavailable(reason.clone()));
            }
            None => {
                return Err(LinkRejection::OriginUnavailable(
                    "origin was not evaluated".to_string(),
                ));
            }
        }
    } else {
        match Url::parse(href) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = page_url.ok_or_else(|| {
                    LinkRejection::Unresolvable(format!("no page URL to resolve '{}'", href))
                })?;
                base.join(href)
                    .map_err(|e| LinkRejection::Unresolvable(format!("{}: {}", href, e)))?
            }
            Err(e) => return Err(LinkRejection::Unresolvable(format!("{}: {}", href, e))),
        }
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return Err(LinkRejection::UnsupportedScheme(resolved.scheme().to_string()));
    }

    let mut url = resolved;
    url.set_fragment(None);
    Ok(url.to_string())
}
