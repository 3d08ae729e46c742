// Endpoint URLs are composed from the configured base URL; only the path
// component changes between the three service calls.

use url::Url;

/// Key-generation endpoint, GET.
pub const GENERATE_PATH: &str = "/.upload/generate";

/// Upload endpoint: GET (optionally suffixed with `/{key}`) for the csrf
/// token, POST for the publish itself.
pub const UPLOAD_PATH: &str = "/.upload/upload";

/// Substitute `path` into the base URL, keeping scheme and host and clearing
/// query and fragment. With no path the base's own path is kept (an empty
/// path reads back as "/").
pub fn endpoint(base: &Url, path: Option<&str>) -> Url {
    let mut url = base.clone();
    if let Some(path) = path {
        url.set_path(path);
    }
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_path_and_clears_query() {
        let base = Url::parse("https://host.example/base?q=1#frag").unwrap();
        let url = endpoint(&base, Some(UPLOAD_PATH));
        assert_eq!(url.as_str(), "https://host.example/.upload/upload");
    }

    #[test]
    fn no_path_keeps_base_path() {
        let base = Url::parse("https://host.example/base?q=1#frag").unwrap();
        let url = endpoint(&base, None);
        assert_eq!(url.as_str(), "https://host.example/base");
    }

    #[test]
    fn empty_base_path_defaults_to_root() {
        let base = Url::parse("http://host.example").unwrap();
        let url = endpoint(&base, None);
        assert_eq!(url.path(), "/");
    }
}
