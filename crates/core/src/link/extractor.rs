//! Regex based link extractor.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use url::Url;

use super::error::LinkError;

/// `[label](https://...)` as produced by most chat clients when copying rich text.
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[.*?\]\((https?://[^\s)]+)\)").expect("markdown link regex is valid")
});

/// A bare `http(s)://` token, or a `domain.tld` with an optional path.
static BARE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(https?://\S+)|\b([\w.-]+\.[a-z]{2,})(/\S*)?")
        .expect("bare link regex is valid")
});

/// Extracts the first usable link from the given text.
///
/// Markdown links win over anything else in the message. Otherwise the
/// leftmost bare link is taken, and a bare domain gets `https://` prepended.
/// The link must have a host and a path: `example.com` alone is rejected,
/// `example.com/video` is accepted.
///
/// Only the best candidate is validated. If it fails, the whole extraction
/// fails and no other candidates are tried.
pub fn extract_link(text: &str) -> Result<Url, LinkError> {
    if text.trim().is_empty() {
        return Err(LinkError::EmptyText);
    }

    let candidate = find_candidate(text).ok_or(LinkError::NotFound)?;

    parse_candidate(&candidate)
}

fn find_candidate(text: &str) -> Option<String> {
    if let Some(target) = MARKDOWN_LINK_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
    {
        return Some(target.as_str().to_string());
    }

    let caps = BARE_LINK_RE.captures(text)?;

    if let Some(link) = caps.get(1) {
        return Some(link.as_str().to_string());
    }

    let domain = caps.get(2)?.as_str();
    let path = caps.get(3).map_or("", |m| m.as_str());

    Some(format!("https://{}{}", domain, path))
}

fn parse_candidate(candidate: &str) -> Result<Url, LinkError> {
    let invalid = || LinkError::InvalidUrl {
        candidate: candidate.to_string(),
    };

    let url = Url::parse(candidate).map_err(|_| invalid())?;

    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    if url.scheme().is_empty() || !has_host || !has_path(candidate) {
        return Err(invalid());
    }

    Ok(url)
}

/// Whether the raw candidate has a path after its authority.
///
/// `Url` always reports `/` as the path of http(s) URLs, so the check is done
/// on the original text instead.
fn has_path(candidate: &str) -> bool {
    let rest = candidate
        .split_once("://")
        .map_or(candidate, |(_, rest)| rest);

    rest.find(|c| matches!(c, '/' | '?' | '#'))
        .is_some_and(|idx| rest[idx..].starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(text: &str) -> String {
        extract_link(text)
            .unwrap_or_else(|e| panic!("expected a link in {:?}, got {}", text, e))
            .to_string()
    }

    #[test]
    fn test_markdown_links() {
        assert_eq!(
            extracted("Download [here](http://example.com/file.zip)"),
            "http://example.com/file.zip"
        );
        assert_eq!(
            extracted("Click [this link](https://secure.com/path/to/file)"),
            "https://secure.com/path/to/file"
        );
    }

    #[test]
    fn test_raw_links() {
        assert_eq!(
            extracted("Here is the link: https://example.org/data.json"),
            "https://example.org/data.json"
        );
        assert_eq!(
            extracted("Check http://foo.bar/test.txt"),
            "http://foo.bar/test.txt"
        );
        assert_eq!(
            extracted("Direct IP: http://192.168.0.1/file.tar.gz 😁"),
            "http://192.168.0.1/file.tar.gz"
        );
        assert_eq!(
            extracted("Localhost\n test: \t\n\n\thttp://localhost:8080/page\t\n"),
            "http://localhost:8080/page"
        );
    }

    #[test]
    fn test_bare_domains_get_https() {
        assert_eq!(
            extracted("Try example.net/asset.png for the image."),
            "https://example.net/asset.png"
        );
        assert_eq!(
            extracted("dash-site.com/files.zip"),
            "https://dash-site.com/files.zip"
        );
        assert_eq!(
            extracted("goto youtu.be/2PuFyjAs7JA to watch the video"),
            "https://youtu.be/2PuFyjAs7JA"
        );
        // Not a real TLD, but still a valid URL.
        assert_eq!(
            extracted("Go to example.invalid/path"),
            "https://example.invalid/path"
        );
    }

    #[test]
    fn test_markdown_preferred_over_bare_links() {
        assert_eq!(
            extracted("See [doc](https://docs.org/manual) or https://alt.org/doc"),
            "https://docs.org/manual"
        );
        assert_eq!(
            extracted("https://alt.org/doc first, then [doc](https://docs.org/manual)"),
            "https://docs.org/manual"
        );
    }

    #[test]
    fn test_first_raw_link_wins() {
        assert_eq!(
            extracted("Try https://first.com/foo and then http://second.com/bar"),
            "https://first.com/foo"
        );
    }

    #[test]
    fn test_query_strings_are_preserved() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=2PuFyjAs7JA&pp=ygUKdGVzdCB2aWRlb9IHCQmwCQGHKiGM7w%3D%3D"),
            "https://www.youtube.com/watch?v=2PuFyjAs7JA&pp=ygUKdGVzdCB2aWRlb9IHCQmwCQGHKiGM7w%3D%3D"
        );
        assert_eq!(
            extracted("https://youtu.be/2PuFyjAs7JA?si=MlSiEJ6yBetaT2Z8"),
            "https://youtu.be/2PuFyjAs7JA?si=MlSiEJ6yBetaT2Z8"
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_link(""), Err(LinkError::EmptyText));
        assert_eq!(extract_link("  \n\t "), Err(LinkError::EmptyText));
    }

    #[test]
    fn test_no_link() {
        assert_eq!(
            extract_link("There is no link here, just text"),
            Err(LinkError::NotFound)
        );
        assert_eq!(
            extract_link("Check [this link](not-a-url)"),
            Err(LinkError::NotFound)
        );
        assert_eq!(
            extract_link("открой запретограм.рф/видео чтобы посмотреть"),
            Err(LinkError::NotFound)
        );
    }

    #[test]
    fn test_links_without_path_are_rejected() {
        assert!(matches!(
            extract_link("example.com"),
            Err(LinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            extract_link("aaa.bbb"),
            Err(LinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            extract_link("https://666"),
            Err(LinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            extract_link("https://example.com?v=1"),
            Err(LinkError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_has_path() {
        assert!(has_path("https://example.com/"));
        assert!(has_path("https://example.com/a?b=c"));
        assert!(!has_path("https://example.com"));
        assert!(!has_path("https://example.com#frag"));
    }
}
