/// Pages the extension refuses to run on
use url::Url;

/// Shown when the active tab has no usable URL
pub const NO_PAGE_REASON: &str = "NodeShot cannot be used on this page";

/// Shown for browser-internal, extension and web store pages
pub const RESTRICTED_PAGE_REASON: &str = "NodeShot cannot be used on browser internal pages";

/// Schemes owned by the browser itself
const RESTRICTED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "chrome-search",
    "chrome-devtools",
    "devtools",
    "about",
    "edge",
    "brave",
    "opera",
    "vivaldi",
    "file",
    "view-source",
];

/// Extension marketplaces: (host, required path prefix)
const MARKETPLACES: &[(&str, &str)] = &[
    ("chrome.google.com", "/webstore"),
    ("chromewebstore.google.com", "/"),
    ("microsoftedge.microsoft.com", "/addons"),
];

/// Check whether a URL is off limits for capture
///
/// Unparseable URLs are treated as restricted.
pub fn is_restricted_url(url: &str) -> bool {
    let parsed = match Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(_) => return true,
    };

    if RESTRICTED_SCHEMES.contains(&parsed.scheme()) {
        return true;
    }

    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return true,
    };

    MARKETPLACES
        .iter()
        .any(|(market_host, path)| host == *market_host && parsed.path().starts_with(path))
}

/// Decide whether capture may start on a tab, returning the reason if not
pub fn check_page(url: Option<&str>) -> Result<(), &'static str> {
    match url {
        None => Err(NO_PAGE_REASON),
        Some(url) if url.trim().is_empty() => Err(NO_PAGE_REASON),
        Some(url) if is_restricted_url(url) => Err(RESTRICTED_PAGE_REASON),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_internal_schemes() {
        assert!(is_restricted_url("chrome://extensions"));
        assert!(is_restricted_url("chrome://settings/privacy"));
        assert!(is_restricted_url("chrome-extension://abcdef/options.html"));
        assert!(is_restricted_url("about:blank"));
        assert!(is_restricted_url("edge://flags"));
        assert!(is_restricted_url("file:///home/user/page.html"));
        assert!(is_restricted_url("view-source:https://example.com"));
    }

    #[test]
    fn test_marketplaces() {
        assert!(is_restricted_url("https://chrome.google.com/webstore/detail/xyz"));
        assert!(is_restricted_url("https://chromewebstore.google.com/detail/xyz"));
        assert!(is_restricted_url("https://microsoftedge.microsoft.com/addons/detail/xyz"));
        assert!(is_restricted_url("https://CHROME.google.com/webstore"));
    }

    #[test]
    fn test_regular_pages_allowed() {
        assert!(!is_restricted_url("https://www.example.com/"));
        assert!(!is_restricted_url("http://localhost:3000/app"));
        assert!(!is_restricted_url("https://chrome.google.com/intl/en/chrome/"));
        assert!(!is_restricted_url("https://microsoftedge.microsoft.com/"));
    }

    #[test]
    fn test_unparseable_is_restricted() {
        assert!(is_restricted_url("not a url"));
        assert!(is_restricted_url(""));
    }

    #[test]
    fn test_check_page_reasons() {
        assert_eq!(check_page(None), Err(NO_PAGE_REASON));
        assert_eq!(check_page(Some("")), Err(NO_PAGE_REASON));
        assert_eq!(check_page(Some("chrome://extensions")), Err(RESTRICTED_PAGE_REASON));
        assert_eq!(check_page(Some("https://example.com")), Ok(()));
    }
}
