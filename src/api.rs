// HTTP client for the storage service: key generation, csrf token fetch and
// the multipart publish itself. All calls are blocking and carry a fresh
// request id; a non-success status anywhere aborts the run.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{multipart, Client};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::endpoint::{endpoint, GENERATE_PATH, UPLOAD_PATH};
use crate::error::{Error, Result};
use crate::mime::MimeInfo;

/// Neutral echo endpoint used by `--debug-post` instead of the service.
static ECHO_URL: Lazy<Url> = Lazy::new(|| Url::parse("https://httpbin.org/post").unwrap());

const FILE_FIELD: &str = "fileToUpload";
const SUBMIT_MARKER: &str = "Upload";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

// The service answers with HTML meant for a browser. These patterns are the
// documented response contract; keep them verbatim rather than switching to
// an HTML parser, so we stay compatible with the service's exact output.
static GENERATED_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<textarea[^>]*>([^<]*)</textarea>").unwrap());
static CSRF_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id="csrf_token" value="([^"]+)""#).unwrap());
static RESULT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a id="([^"]+)" href="([^"]+)">"#).unwrap());

/// Blocking client for the three service endpoints. Holds the reqwest
/// client and the configured base URL.
pub struct UploadClient {
    client: Client,
    base_url: Url,
    debug_post: bool,
}

impl UploadClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(UploadClient {
            client,
            base_url: config.base_url.clone(),
            debug_post: config.debug_post,
        })
    }

    /// Ask the service for a fresh publishing key. The key is the text
    /// content of the textarea in the generate page.
    pub fn generate_key(&self) -> Result<String> {
        let url = endpoint(&self.base_url, Some(GENERATE_PATH));
        tracing::debug!(%url, "requesting a fresh publishing key");
        let body = self.get_html(&url)?;
        GENERATED_KEY_RE
            .captures(&body)
            .map(|c| c[1].trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingKey {
                url: url.to_string(),
            })
    }

    /// Fetch an anti-forgery token scoped to `key` (or to no key). Tokens
    /// are presumed single-use: call this before every publish.
    pub fn fetch_token(&self, key: Option<&str>) -> Result<String> {
        let path = match key {
            Some(key) => format!("{UPLOAD_PATH}/{key}"),
            None => UPLOAD_PATH.to_string(),
        };
        let url = endpoint(&self.base_url, Some(&path));
        tracing::debug!(%url, "fetching csrf token");
        let body = self.get_html(&url)?;
        CSRF_TOKEN_RE
            .captures(&body)
            .map(|c| c[1].to_string())
            .ok_or(Error::MissingToken {
                url: url.to_string(),
            })
    }

    /// Publish one file to `target` under `key` and return the raw response
    /// body. An empty target designates the key's root/index document.
    pub fn publish(
        &self,
        target: &str,
        file: &Path,
        mime: &MimeInfo,
        key: &str,
    ) -> Result<String> {
        let token = self.fetch_token(if key.is_empty() { None } else { Some(key) })?;
        let url = if self.debug_post {
            ECHO_URL.clone()
        } else {
            endpoint(&self.base_url, Some(UPLOAD_PATH))
        };

        let mime_string = mime.to_string();
        let part = multipart::Part::reader(File::open(file)?)
            .file_name(file.display().to_string())
            .mime_str(&mime_string)?;
        let version = Utc::now().timestamp_millis().to_string();
        let form = multipart::Form::new()
            .part(FILE_FIELD, part)
            .text("path", target.to_string())
            .text("mime_type", mime_string.clone())
            .text("privateKey", key.to_string())
            .text("csrf_token", token)
            .text("version", version.clone())
            .text("submit", SUBMIT_MARKER);

        tracing::debug!(
            %url,
            target_path = target,
            mime = %mime_string,
            version,
            key = "<redacted>",
            "publishing"
        );
        let res = self
            .client
            .post(url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .multipart(form)
            .send()?;
        if !res.status().is_success() {
            return Err(Error::Upload {
                path: file.to_path_buf(),
                status: res.status(),
            });
        }
        Ok(res.text()?)
    }

    fn get_html(&self, url: &Url) -> Result<String> {
        let res = self
            .client
            .get(url.clone())
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()?;
        if !res.status().is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: res.status(),
            });
        }
        Ok(res.text()?)
    }
}

/// Scan a publish response for result keys: anchors whose id is the
/// key-type label and whose href is the content-address link, in document
/// order. Zero matches is a valid outcome.
pub fn extract_keys(body: &str) -> Vec<(String, String)> {
    RESULT_KEY_RE
        .captures_iter(body)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_keys_come_back_in_document_order() {
        let body = r#"<html><body>
            <a id="mbase32" href="K1">one</a>
            <a id="mbase58" href="K2">two</a>
        </body></html>"#;
        assert_eq!(
            extract_keys(body),
            vec![
                ("mbase32".to_string(), "K1".to_string()),
                ("mbase58".to_string(), "K2".to_string()),
            ]
        );
    }

    #[test]
    fn no_anchors_is_not_an_error() {
        assert!(extract_keys("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn generated_key_pattern_reads_textarea_content() {
        let body = r#"<textarea id="key" rows="1">3mJr7AoUXx2Wqd</textarea>"#;
        let caps = GENERATED_KEY_RE.captures(body).unwrap();
        assert_eq!(&caps[1], "3mJr7AoUXx2Wqd");
    }

    #[test]
    fn token_pattern_reads_input_value() {
        let body = r#"<input type="hidden" id="csrf_token" value="t0k3n"/>"#;
        let caps = CSRF_TOKEN_RE.captures(body).unwrap();
        assert_eq!(&caps[1], "t0k3n");
    }
}
