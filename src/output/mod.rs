//! Output dispatch: temp-file previews, clipboard, and the diffy.org
//! paste service.

use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::core::RawDiff;

/// Paste service endpoint the raw diff is published to.
const PUBLISH_ENDPOINT: &str = "http://diffy.org/api/new";
/// Cap on the publish response body.
const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

/// Errors that can occur while publishing a diff.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The request could not complete or its body could not be read.
    #[error("publish request failed: {0}")]
    Transport(Box<ureq::Error>),

    /// The response body was not the expected JSON shape.
    #[error("unexpected response from the publish service: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The service reported success but returned no link.
    #[error("publish service returned no url")]
    MissingUrl,

    /// The service accepted the request but rejected the diff.
    #[error("publish rejected by the service: status {status_code}")]
    RemoteRejected {
        /// Status code reported in the response body.
        status_code: i64,
    },
}

/// Opens a path or URL with the OS default application.
pub trait Opener {
    /// Ask the OS to open `target` with its associated application.
    fn open(&self, target: &str) -> io::Result<()>;
}

/// [`Opener`] backed by the system launcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, target: &str) -> io::Result<()> {
        open::that(target)
    }
}

/// Writes text to a clipboard.
pub trait ClipboardSink {
    /// Copy `text` to the clipboard.
    fn copy(&self, text: &str) -> io::Result<()>;
}

/// [`ClipboardSink`] backed by the system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> io::Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(io::Error::other)?;
        clipboard.set_text(text.to_string()).map_err(io::Error::other)
    }
}

/// How a published link is delivered back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Open the link in the default browser.
    Browser,
    /// Copy the link to the clipboard.
    Clipboard,
}

impl Delivery {
    /// Map a CLI value onto a delivery mode.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "browser" => Some(Self::Browser),
            "clipboard" => Some(Self::Clipboard),
            _ => None,
        }
    }
}

/// Write `content` to `diff.<format>` in the OS temp directory and open
/// it with the default application.
///
/// The same path is reused across invocations, so previews never pile up.
/// A viewer that fails to launch is logged and ignored; the file itself
/// is the result.
#[must_use = "this returns a Result that should be checked"]
pub fn preview(content: &str, format: &str, opener: &dyn Opener) -> io::Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("diff.{}", format));
    std::fs::write(&path, content)?;
    log::info!("preview written to {}", path.display());

    if let Err(e) = opener.open(&path.to_string_lossy()) {
        log::warn!("failed to open {}: {}", path.display(), e);
    }
    Ok(path)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status_code: Option<i64>,
}

/// Publish raw diff text to diffy.org as `{"udiff": …}` and deliver the
/// returned link.
///
/// On success the attribution line and link are printed, the link is
/// routed per `delivery`, and returned. A delivery step that fails is
/// logged rather than masking the link that was already obtained.
#[must_use = "this returns a Result that should be checked"]
pub fn publish(
    diff: &RawDiff,
    delivery: Delivery,
    opener: &dyn Opener,
    clipboard: &dyn ClipboardSink,
) -> Result<String, PublishError> {
    let payload = serde_json::json!({ "udiff": diff.as_str() }).to_string();
    let agent = publish_agent();

    log::debug!("publishing {} bytes to {}", payload.len(), PUBLISH_ENDPOINT);

    let response = agent
        .post(PUBLISH_ENDPOINT)
        .header("Content-Type", "application/json")
        .send(payload.as_bytes())
        .map_err(|e| PublishError::Transport(Box::new(e)))?;

    let body = response
        .into_body()
        .with_config()
        .limit(MAX_RESPONSE_SIZE)
        .read_to_string()
        .map_err(|e| PublishError::Transport(Box::new(e)))?;

    let url = parse_publish_response(&body)?;

    println!("Link powered by diffy.org:");
    println!("{}", url);

    deliver_link(&url, delivery, opener, clipboard);
    Ok(url)
}

/// Agent for the publish call.
///
/// The service reports failures in the JSON body, not the HTTP status.
/// No timeout is configured: a stalled service blocks the call until it
/// answers or the connection drops.
fn publish_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into()
}

/// Parse the service response, yielding the shareable link.
fn parse_publish_response(body: &str) -> Result<String, PublishError> {
    let response: PublishResponse = serde_json::from_str(body)?;
    if response.status == "error" {
        return Err(PublishError::RemoteRejected {
            status_code: response.status_code.unwrap_or(0),
        });
    }
    response.url.ok_or(PublishError::MissingUrl)
}

fn deliver_link(url: &str, delivery: Delivery, opener: &dyn Opener, clipboard: &dyn ClipboardSink) {
    match delivery {
        Delivery::Browser => {
            if let Err(e) = opener.open(url) {
                log::warn!("failed to open browser: {}", e);
            }
        }
        Delivery::Clipboard => {
            if let Err(e) = clipboard.copy(url) {
                log::warn!("failed to copy link to clipboard: {}", e);
            }
        }
    }
}
