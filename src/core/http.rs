use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, Url};

use crate::core::error::{LauncherError, LauncherResult};

const APP_USER_AGENT: &str = concat!("launcher-sync/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. Content is requested uncompressed so byte counts
/// match the manifest sizes.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

pub fn parse_url(raw: &str) -> LauncherResult<Url> {
    Url::parse(raw).map_err(|e| LauncherError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Append a `/`-separated relative path to `base`, percent-encoding each
/// segment.
pub fn join_path(base: &Url, relative: &str) -> LauncherResult<Url> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| LauncherError::InvalidUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".into(),
        })?;
        segments.pop_if_empty();
        segments.extend(relative.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_encodes_segments() {
        let base = parse_url("https://cdn.example.com/files/").unwrap();
        let url = join_path(&base, "mods/My Mod.jar").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/files/mods/My%20Mod.jar");
    }

    #[test]
    fn join_path_without_trailing_slash() {
        let base = parse_url("https://cdn.example.com/files").unwrap();
        let url = join_path(&base, "config/a.cfg").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/files/config/a.cfg");
    }

    #[test]
    fn parse_url_rejects_garbage() {
        assert!(parse_url("not a url").is_err());
    }
}
