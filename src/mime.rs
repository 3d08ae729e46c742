//! Layered MIME detection: magic bytes first, file extension as fallback,
//! `application/octet-stream` when nothing matches.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Fallback content type if no content type is detected.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// How many leading bytes to sniff.
const SNIFF_WINDOW: usize = 8192;

/// A resolved content type plus an optional encoding guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeInfo {
    pub mime: String,
    pub charset: Option<String>,
}

impl fmt::Display for MimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={}", self.mime, charset),
            None => write!(f, "{}", self.mime),
        }
    }
}

/// Determine the MIME type of the file at `path`.
///
/// The path is resolved through symlinks for inspection only; callers keep
/// their own notion of file identity. Empty files get the default type
/// straight away, since sniffing them yields a meaningless pseudo-type.
/// Missing or unreadable files are fatal for the run and propagate.
pub fn detect(path: &Path, sniff: bool) -> Result<MimeInfo> {
    let real = std::fs::canonicalize(path)?;
    if std::fs::metadata(&real)?.len() == 0 {
        return Ok(MimeInfo {
            mime: DEFAULT_MIME.to_string(),
            charset: None,
        });
    }

    let mut mime = None;
    let mut charset = None;
    if sniff {
        let window = read_window(&real)?;
        if let Some(kind) = infer::get(&window) {
            mime = Some(kind.mime_type().to_string());
        }
        charset = match sniff_encoding(&window) {
            // "binary" carries no information, treat as unknown
            "binary" => None,
            encoding => Some(encoding.to_string()),
        };
    }
    if mime.is_none() {
        // strict extension lookup: only well-known extensions match
        mime = mime_guess::from_path(&real)
            .first()
            .map(|m| m.essence_str().to_string());
    }

    Ok(match mime {
        Some(mime) => MimeInfo { mime, charset },
        None => MimeInfo {
            mime: DEFAULT_MIME.to_string(),
            charset: None,
        },
    })
}

fn read_window(path: &Path) -> Result<Vec<u8>> {
    let mut window = vec![0u8; SNIFF_WINDOW];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < window.len() {
        let n = file.read(&mut window[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    window.truncate(filled);
    Ok(window)
}

/// Classify the sniff window as us-ascii, utf-8 or binary. A multibyte
/// sequence cut off at the window edge still counts as utf-8.
fn sniff_encoding(window: &[u8]) -> &'static str {
    if window.is_ascii() {
        return "us-ascii";
    }
    match std::str::from_utf8(window) {
        Ok(_) => "utf-8",
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => "utf-8",
        Err(_) => "binary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn empty_file_gets_default_type() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.png", b"");
        assert_eq!(detect(&path, true).unwrap().to_string(), DEFAULT_MIME);
        assert_eq!(detect(&path, false).unwrap().to_string(), DEFAULT_MIME);
    }

    #[test]
    fn magic_bytes_win_over_extension() {
        let dir = TempDir::new().unwrap();
        let png = b"\x89PNG\r\n\x1a\n0000000000000000";
        let path = write_file(&dir, "picture.txt", png);
        let info = detect(&path, true).unwrap();
        assert_eq!(info.mime, "image/png");
        assert_eq!(info.to_string(), "image/png");
    }

    #[test]
    fn ascii_text_falls_back_to_extension_with_charset() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", b"plain old text\n");
        let info = detect(&path, true).unwrap();
        assert_eq!(info.to_string(), "text/plain; charset=us-ascii");
    }

    #[test]
    fn utf8_text_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", "héllo wörld\n".as_bytes());
        let info = detect(&path, true).unwrap();
        assert_eq!(info.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn sniffing_disabled_uses_extension_only() {
        let dir = TempDir::new().unwrap();
        let png = b"\x89PNG\r\n\x1a\n0000000000000000";
        let path = write_file(&dir, "picture.txt", png);
        let info = detect(&path, false).unwrap();
        assert_eq!(info.to_string(), "text/plain");
    }

    #[test]
    fn unknown_everything_gets_default_alone() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "mystery.zzz", b"no magic here\n");
        let info = detect(&path, true).unwrap();
        assert_eq!(info.to_string(), DEFAULT_MIME);
        assert_eq!(info.charset, None);
    }

    #[test]
    fn missing_file_propagates() {
        assert!(detect(Path::new("/no/such/file"), true).is_err());
    }
}
