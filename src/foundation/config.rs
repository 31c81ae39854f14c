use crate::foundation::error::{PreviewError, PreviewResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Default remote endpoint hosting the preview surface.
pub const DEFAULT_ENDPOINT: &str = "https://creatomate.com";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Which flavour of embedded surface to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Playback-only preview.
    #[default]
    Player,
    /// Preview that also accepts direct manipulation.
    Interactive,
}

impl SurfaceKind {
    /// Path segment used in the surface URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Interactive => "interactive",
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling how a [`crate::Player`] reaches and talks to its remote surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Base URL of the remote rendering surface, e.g. `https://creatomate.com`.
    ///
    /// Its scheme and host (plus port, if any) form the only origin inbound messages are
    /// accepted from.
    pub endpoint: String,
    /// Per-request timeout in milliseconds. `None` waits until a reply or disposal.
    pub request_timeout_ms: Option<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> PreviewResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PreviewError::validation(format!("parse player config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PreviewError::validation(format!("open player config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Replace the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the request timeout. `None` disables it.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map(|t| t.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    /// The request timeout as a [`Duration`], if enabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Check the endpoint is an absolute `http(s)` URL with a host.
    pub fn validate(&self) -> PreviewResult<()> {
        let origin = self.origin()?;
        if self.request_timeout_ms == Some(0) {
            return Err(PreviewError::validation(
                "request_timeout_ms must be positive (use null to disable)",
            ));
        }
        tracing::trace!(origin, "player config validated");
        Ok(())
    }

    /// Scheme + host (+ port) of the endpoint.
    pub fn origin(&self) -> PreviewResult<&str> {
        let endpoint = self.endpoint.as_str();
        let rest = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"))
            .ok_or_else(|| {
                PreviewError::validation(format!(
                    "endpoint '{endpoint}' must start with http:// or https://"
                ))
            })?;
        let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        if host_len == 0 {
            return Err(PreviewError::validation(format!(
                "endpoint '{endpoint}' has no host"
            )));
        }
        let scheme_len = endpoint.len() - rest.len();
        Ok(&endpoint[..scheme_len + host_len])
    }

    /// URL the embedded surface is pointed at for `kind` and `token`.
    pub fn surface_url(&self, kind: SurfaceKind, token: &str) -> PreviewResult<String> {
        validate_token(token)?;
        let base = self.endpoint.trim_end_matches('/');
        Ok(format!("{base}/{kind}?token={token}"))
    }
}

/// Identity tokens are interpolated into the surface URL verbatim, so only URL-safe characters
/// are accepted.
pub fn validate_token(token: &str) -> PreviewResult<()> {
    if token.is_empty() {
        return Err(PreviewError::validation("identity token must not be empty"));
    }
    if let Some(c) = token
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(PreviewError::validation(format!(
            "identity token contains unsupported character {c:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
