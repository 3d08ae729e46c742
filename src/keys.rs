// Local half of key handling: alphabet validation and reading a key from a
// file or the environment. Remote generation is an HTTP concern and lives on
// `api::UploadClient`.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Alphabet of publishing keys: base58, digits and letters without the
/// visually ambiguous 0, O, I and l.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// The service's other key kind uses z-base-32. Not exercised by the upload
/// flow, but validated with the same routine.
pub const ZBASE32_ALPHABET: &str = "ybndrfg8ejkmcpqxot1uwisza345h769";

/// Environment variable consulted for a default publishing key when no
/// `-k` flag is given.
pub const KEY_ENV_VAR: &str = "CASUP_KEY";

/// True iff every character of `key` belongs to `alphabet`. The empty
/// string is valid: it represents "no key".
pub fn is_valid_key(key: &str, alphabet: &str) -> bool {
    key.chars().all(|c| alphabet.contains(c))
}

fn first_invalid(key: &str, alphabet: &str) -> Option<char> {
    key.chars().find(|c| !alphabet.contains(*c))
}

/// Read a publishing key from a file. All whitespace is stripped, so
/// multi-line key files are accepted. An empty result is absence, not an
/// error (a key file pointed at /dev/null means "generate one").
pub fn read_key_file(path: &Path) -> Result<Option<String>> {
    let raw = fs::read_to_string(path).map_err(|source| Error::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    let key: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if key.is_empty() {
        return Ok(None);
    }
    if let Some(ch) = first_invalid(&key, BASE58_ALPHABET) {
        return Err(Error::InvalidKey {
            origin: path.display().to_string(),
            ch,
        });
    }
    Ok(Some(key))
}

/// Key from the environment, validated the same way as a key file.
pub fn key_from_env() -> Result<Option<String>> {
    let raw = match std::env::var(KEY_ENV_VAR) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    let key = raw.trim().to_string();
    if key.is_empty() {
        return Ok(None);
    }
    if let Some(ch) = first_invalid(&key, BASE58_ALPHABET) {
        return Err(Error::InvalidKey {
            origin: format!("${KEY_ENV_VAR}"),
            ch,
        });
    }
    Ok(Some(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_key_is_vacuously_valid() {
        assert!(is_valid_key("", BASE58_ALPHABET));
        assert!(is_valid_key("", ZBASE32_ALPHABET));
    }

    #[test]
    fn base58_accepts_its_alphabet_only() {
        assert!(is_valid_key("3mJr7AoUXx2Wqd", BASE58_ALPHABET));
        // 0, O, I and l are excluded on purpose
        assert!(!is_valid_key("0", BASE58_ALPHABET));
        assert!(!is_valid_key("O", BASE58_ALPHABET));
        assert!(!is_valid_key("I", BASE58_ALPHABET));
        assert!(!is_valid_key("l", BASE58_ALPHABET));
        assert!(!is_valid_key("abc!123", BASE58_ALPHABET));
    }

    #[test]
    fn zbase32_is_a_different_alphabet() {
        assert!(is_valid_key("ybndrfg8", ZBASE32_ALPHABET));
        assert!(!is_valid_key("v", ZBASE32_ALPHABET));
        assert!(!is_valid_key("0", ZBASE32_ALPHABET));
    }

    #[test]
    fn key_file_strips_all_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "3mJr\n7AoU \n\tXx2W\n").unwrap();
        let key = read_key_file(file.path()).unwrap();
        assert_eq!(key.as_deref(), Some("3mJr7AoUXx2W"));
        // a second read returns the same stripped key
        let again = read_key_file(file.path()).unwrap();
        assert_eq!(again, key);
    }

    #[test]
    fn empty_key_file_means_no_key() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(read_key_file(file.path()).unwrap(), None);

        let mut blank = tempfile::NamedTempFile::new().unwrap();
        write!(blank, "  \n\t\n").unwrap();
        assert_eq!(read_key_file(blank.path()).unwrap(), None);
    }

    #[test]
    fn key_file_with_invalid_character_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "abc!123").unwrap();
        let err = read_key_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid character '!'"), "{err}");
    }

    #[test]
    fn missing_key_file_is_a_read_error() {
        let err = read_key_file(Path::new("/no/such/key/file")).unwrap_err();
        assert!(matches!(err, Error::KeyFile { .. }));
        assert!(err.to_string().contains("/no/such/key/file"));
    }
}
