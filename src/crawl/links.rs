//! Link discovery and classification.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::Tree;

/// Suffixes of image resources.
const IMAGE_SUFFIXES: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "ico", "tif", "pcx", "tga", "exif", "fpx", "svg",
    "psd", "cdr", "pcd", "dxf", "ufo", "eps", "ai", "raw", "wmf",
];

/// Suffixes of downloadable files.
const FILE_SUFFIXES: &[&str] = &[
    "7z", "rar", "zip", "gz", "pdf", "txt", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "eml",
    "csv", "epub", "json", "msg", "odt", "rm", "avi", "mp4", "mpg", "mov", "swf", "rtf", "xlsm",
    "xltx", "xltm",
];

/// Suffixes that are never followed.
const UNSUPPORTED_SUFFIXES: &[&str] = &["css", "js", "jsp"];

/// Attributes that carry links.
const LINK_ATTRIBUTES: &[&str] = &["href", "src"];

/// A link that could not be turned into an absolute URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The page URL itself is not a valid absolute URL.
    #[error("Invalid base URL {url:?}: {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// An attribute value could not be resolved against the page URL.
    #[error("Cannot resolve {link:?}: {source}")]
    Unresolvable {
        link: String,
        #[source]
        source: url::ParseError,
    },
}

/// What a URL points at, judged by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A page to convert to text
    Webpage,
    /// An image resource
    Image,
    /// A downloadable file
    File,
    /// A stylesheet or script, never followed
    Unsupported,
}

impl LinkKind {
    /// Classify a URL by the text after its last dot.
    ///
    /// Comparison ignores ASCII case. A URL without a recognized suffix is a
    /// webpage.
    pub fn of(url: &str) -> Self {
        let suffix = url.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        let suffix = suffix.as_str();
        if IMAGE_SUFFIXES.contains(&suffix) {
            LinkKind::Image
        } else if FILE_SUFFIXES.contains(&suffix) {
            LinkKind::File
        } else if UNSUPPORTED_SUFFIXES.contains(&suffix) {
            LinkKind::Unsupported
        } else {
            LinkKind::Webpage
        }
    }

    /// Whether a crawler should request the URL at all.
    pub fn is_followed(&self) -> bool {
        *self != LinkKind::Unsupported
    }

    /// Whether repeated requests for the URL should bypass duplicate
    /// filtering. Media is fetched each time it is linked.
    pub fn bypasses_dedupe(&self) -> bool {
        matches!(self, LinkKind::Image | LinkKind::File)
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            LinkKind::Webpage => "webpage",
            LinkKind::Image => "image",
            LinkKind::File => "file",
            LinkKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An absolute link found in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Resolved absolute URL
    pub url: String,

    /// Classification by suffix
    pub kind: LinkKind,
}

impl Link {
    /// Create a link, classifying the URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = LinkKind::of(&url);
        Self { url, kind }
    }
}

/// Resolve one attribute value against the page URL.
pub fn resolve(base: &Url, link: &str) -> Result<Url, LinkError> {
    base.join(link.trim()).map_err(|source| LinkError::Unresolvable {
        link: link.to_string(),
        source,
    })
}

/// Collect every `href` and `src` value in a tree as absolute links.
///
/// Links are deduplicated and kept in document order. Values that cannot
/// be resolved are logged and skipped; only an invalid page URL fails.
pub fn discover_links(tree: &Tree, base_url: &str) -> Result<Vec<Link>, LinkError> {
    let base = Url::parse(base_url).map_err(|source| LinkError::InvalidBase {
        url: base_url.to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for id in tree.elements() {
        let Some(element) = tree.get(id).element() else {
            continue;
        };
        for &name in LINK_ATTRIBUTES {
            let Some(value) = element.attr(name) else {
                continue;
            };
            match resolve(&base, value) {
                Ok(url) => {
                    let url = url.to_string();
                    if seen.insert(url.clone()) {
                        links.push(Link::new(url));
                    }
                }
                Err(e) => log::warn!("Skipping link on {}: {}", base_url, e),
            }
        }
    }

    log::debug!("Discovered {} links on {}", links.len(), base_url);
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_classify_suffixes() {
        assert_eq!(LinkKind::of("http://x.com/a/photo.JPG"), LinkKind::Image);
        assert_eq!(LinkKind::of("http://x.com/icon.WMF"), LinkKind::Image);
        assert_eq!(LinkKind::of("http://x.com/report.pdf"), LinkKind::File);
        assert_eq!(LinkKind::of("http://x.com/site.css"), LinkKind::Unsupported);
        assert_eq!(LinkKind::of("http://x.com/page.html"), LinkKind::Webpage);
        assert_eq!(LinkKind::of("http://x.com/about"), LinkKind::Webpage);
    }

    #[test]
    fn test_follow_rules() {
        assert!(!LinkKind::Unsupported.is_followed());
        assert!(LinkKind::Webpage.is_followed());
        assert!(LinkKind::File.bypasses_dedupe());
        assert!(!LinkKind::Webpage.bypasses_dedupe());
    }

    #[test]
    fn test_discover_links_resolves_and_dedupes() {
        let tree = parse_html(
            r#"<a href="/about">About</a>
               <img src="img/logo.png">
               <a href="https://other.org/x.zip">zip</a>
               <a href="/about">again</a>
               <script src="app.js"></script>"#,
        );
        let links = discover_links(&tree, "http://example.com/dir/index.html").unwrap();
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://example.com/about",
                "http://example.com/dir/img/logo.png",
                "https://other.org/x.zip",
                "http://example.com/dir/app.js",
            ]
        );
        let kinds: Vec<_> = links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LinkKind::Webpage, LinkKind::Image, LinkKind::File, LinkKind::Unsupported]
        );
    }

    #[test]
    fn test_unresolvable_link_skipped() {
        let tree = parse_html(r#"<a href="http://[broken">x</a><a href="ok">y</a>"#);
        let links = discover_links(&tree, "http://example.com/").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://example.com/ok");
    }

    #[test]
    fn test_invalid_base() {
        let tree = parse_html("<a href='x'>x</a>");
        let err = discover_links(&tree, "not a url").unwrap_err();
        assert!(matches!(err, LinkError::InvalidBase { .. }));
    }
}
