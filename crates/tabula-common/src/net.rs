//! Blocking fetch helpers for cell images.
//!
//! Image sources name a resource by URL-ish string: `http(s)://…`, an
//! RFC 2397 `data:` URL, or a local filesystem path. [`fetch_resource`]
//! dispatches on the scheme and returns the raw bytes; decoding is the
//! caller's concern.
//!
//! Every call blocks the calling thread. There is no retry; the timeout below
//! is the only latency policy.

use base64::Engine;
use std::fs;
use std::time::Duration;
use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("tabula/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to obtain the bytes of a resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built or the request failed in transit.
    #[error("request to '{url}' failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        reason: String,
    },
    /// The server answered with a non-success status.
    #[error("'{url}' answered with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },
    /// A `data:` URL could not be decoded.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    /// A local file could not be read.
    #[error("failed to read '{path}': {source}")]
    File {
        /// Path that was read.
        path: String,
        /// I/O error from the filesystem.
        #[source]
        source: std::io::Error,
    },
}

/// A parsed `data:` URL (`data:[<mediatype>][;base64],<data>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type, e.g. `image/png`. Empty when omitted.
    pub media_type: &'a str,
    /// Whether the payload is base64-encoded.
    pub base64: bool,
    /// The raw payload after the comma.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a `data:` URL into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] if the scheme or the comma separator
    /// is missing.
    pub fn parse(url: &'a str) -> Result<Self, FetchError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| FetchError::DataUrl("missing 'data:' scheme".to_string()))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| FetchError::DataUrl("missing comma".to_string()))?;
        let (media_type, base64) = metadata
            .strip_suffix(";base64")
            .map_or((metadata, false), |media| (media, true));
        Ok(Self {
            media_type,
            base64,
            payload,
        })
    }

    /// Decode the payload into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] for malformed base64 or percent escapes.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        if self.base64 {
            base64::engine::general_purpose::STANDARD
                .decode(self.payload.trim())
                .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))
        } else {
            percent_decode(self.payload)
        }
    }
}

/// Decode `%XX` escapes; everything else passes through byte for byte.
fn percent_decode(input: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .ok_or_else(|| FetchError::DataUrl(format!("truncated escape at byte {i}")))?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| FetchError::DataUrl(format!("bad escape '%{hex}'")))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Fetch a URL over HTTP(S) and return its body.
///
/// # Errors
///
/// Returns [`FetchError::Transport`] if the client cannot be created or the
/// request fails, and [`FetchError::Status`] on a non-success status.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let transport = |e: reqwest::Error| FetchError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(transport)?;

    let response = client.get(url).send().map_err(transport)?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.bytes().map(|b| b.to_vec()).map_err(transport)
}

/// Fetch a resource by scheme: HTTP(S), `data:` URL, or local path.
///
/// # Errors
///
/// Propagates the [`FetchError`] of whichever transport was used.
pub fn fetch_resource(url: &str) -> Result<Vec<u8>, FetchError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        log::debug!("fetching image over HTTP: {url}");
        fetch_bytes(url)
    } else if url.starts_with("data:") {
        DataUrl::parse(url)?.decode()
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        fs::read(path).map_err(|source| FetchError::File {
            path: path.to_string(),
            source,
        })
    }
}
