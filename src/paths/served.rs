//! Public URL and served base path computation.
//!
//! The served path is the URL prefix the built assets are expected to be
//! hosted under. The bundler needs it to emit absolute `<script>` and `<link>`
//! references, since single-page apps serve `index.html` for nested routes
//! like `/todos/42` and relative references would break there.

use url::Url;

/// Add or strip a single trailing `/`.
///
/// With `needs_slash` a missing slash is appended; without it exactly one
/// trailing slash is removed. Otherwise the path is returned unchanged.
///
/// # Examples
///
/// ```
/// # use spa_scripts::paths::ensure_slash;
/// assert_eq!(ensure_slash("/app", true), "/app/");
/// assert_eq!(ensure_slash("/app/", true), "/app/");
/// assert_eq!(ensure_slash("/app/", false), "/app");
/// ```
#[must_use]
pub fn ensure_slash(path: &str, needs_slash: bool) -> String {
    let has_slash = path.ends_with('/');

    if has_slash && !needs_slash {
        path[..path.len() - 1].to_string()
    } else if !has_slash && needs_slash {
        format!("{path}/")
    } else {
        path.to_string()
    }
}

/// The public URL: the override when given, otherwise the manifest homepage.
///
/// Empty strings count as absent.
#[must_use]
pub fn public_url(override_url: Option<&str>, homepage: Option<&str>) -> Option<String> {
    override_url
        .filter(|u| !u.is_empty())
        .or_else(|| homepage.filter(|h| !h.is_empty()))
        .map(str::to_string)
}

/// The served base path, always ending in exactly one `/`.
///
/// The override is used verbatim. Otherwise the path component of the
/// homepage URL is used, falling back to `/`.
///
/// # Examples
///
/// ```
/// # use spa_scripts::paths::served_path;
/// assert_eq!(served_path(None, Some("http://user.github.io/app")), "/app/");
/// assert_eq!(served_path(None, None), "/");
/// assert_eq!(served_path(Some("/cdn"), Some("http://x.com/app")), "/cdn/");
/// ```
#[must_use]
pub fn served_path(override_url: Option<&str>, homepage: Option<&str>) -> String {
    let served = match override_url.filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => homepage
            .filter(|h| !h.is_empty())
            .map_or_else(|| "/".to_string(), url_pathname),
    };

    ensure_slash(&served, true)
}

/// Extract the path component of an absolute or relative URL.
fn url_pathname(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url)
        && !parsed.cannot_be_a_base()
    {
        return parsed.path().to_string();
    }

    // Relative homepage such as "/app" or ".": keep everything before the
    // query string or fragment.
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];

    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_slash_adds_missing_slash() {
        assert_eq!(ensure_slash("/app", true), "/app/");
        assert_eq!(ensure_slash("", true), "/");
    }

    #[test]
    fn test_ensure_slash_never_duplicates() {
        assert_eq!(ensure_slash("/app/", true), "/app/");
        assert_eq!(ensure_slash("/", true), "/");
    }

    #[test]
    fn test_ensure_slash_strips_one_trailing_slash() {
        assert_eq!(ensure_slash("/app/", false), "/app");
        assert_eq!(ensure_slash("/app//", false), "/app/");
        assert_eq!(ensure_slash("/app", false), "/app");
    }

    #[test]
    fn test_public_url_prefers_override() {
        assert_eq!(
            public_url(Some("https://cdn.example.com"), Some("http://x.com")),
            Some("https://cdn.example.com".to_string())
        );
        assert_eq!(
            public_url(None, Some("http://x.com")),
            Some("http://x.com".to_string())
        );
        assert_eq!(public_url(Some(""), Some("http://x.com")), Some("http://x.com".to_string()));
        assert_eq!(public_url(None, None), None);
    }

    #[test]
    fn test_served_path_from_github_pages_homepage() {
        assert_eq!(served_path(None, Some("http://user.github.io/app")), "/app/");
    }

    #[test]
    fn test_served_path_from_root_homepage() {
        assert_eq!(served_path(None, Some("http://mywebsite.com")), "/");
        assert_eq!(served_path(None, Some("http://mywebsite.com/")), "/");
    }

    #[test]
    fn test_served_path_ignores_query_and_fragment() {
        assert_eq!(
            served_path(None, Some("https://example.com/app/?ref=1#top")),
            "/app/"
        );
    }

    #[test]
    fn test_served_path_relative_homepage() {
        assert_eq!(served_path(None, Some(".")), "./");
        assert_eq!(served_path(None, Some("/nested/app")), "/nested/app/");
    }

    #[test]
    fn test_served_path_override_is_verbatim() {
        assert_eq!(
            served_path(Some("https://cdn.example.com/assets"), Some("http://x.com/app")),
            "https://cdn.example.com/assets/"
        );
        assert_eq!(served_path(Some("/static/"), None), "/static/");
    }

    #[test]
    fn test_served_path_always_single_trailing_slash() {
        let overrides = [None, Some("/a"), Some("/a/"), Some("")];
        let homepages = [None, Some("http://h.com/b"), Some("http://h.com/b/"), Some("")];

        for o in overrides {
            for h in homepages {
                let served = served_path(o, h);
                assert!(served.ends_with('/'), "{served:?} for {o:?}/{h:?}");
                assert!(!served.ends_with("//"), "{served:?} for {o:?}/{h:?}");
            }
        }
    }
}
