//! Sitemap parsing and repository path derivation.
//!
//! `<loc>` entries are pulled out with a pattern rather than an XML parser, so a document
//! with broken markup elsewhere still yields every well-formed location tag.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::errors::AppError;
use crate::fetch::{parse_fetchable_url, PageFetcher};
use crate::models::{CandidatePage, ParsedSitemap};

const DEFAULT_EXTENSION: &str = ".html";

fn loc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Optional namespace prefix; whitespace around the value, newlines included, is trimmed
        Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?loc>\s*(.*?)\s*</(?:[A-Za-z_][\w.-]*:)?loc>")
            .expect("loc pattern is valid")
    })
}

/// Fetch a sitemap and derive a candidate page for every valid `<loc>` URL.
pub async fn parse_sitemap(
    fetcher: &PageFetcher,
    sitemap_url: &str,
) -> Result<ParsedSitemap, AppError> {
    let url = parse_fetchable_url(sitemap_url, "Sitemap URL")?;

    tracing::info!("Fetching sitemap from {}", url);
    let body = fetcher.fetch_text(url.as_str(), "sitemap").await?;

    let locations = extract_locations(&body);
    let pages: Vec<CandidatePage> = locations
        .iter()
        .filter_map(|loc| {
            let candidate = derive_candidate(loc);
            if candidate.is_none() {
                tracing::debug!("Dropping unparseable sitemap URL: {}", loc);
            }
            candidate
        })
        .collect();

    tracing::info!(
        "Sitemap {} listed {} URLs, {} valid pages",
        url,
        locations.len(),
        pages.len()
    );

    Ok(ParsedSitemap {
        pages,
        total_urls: locations.len(),
    })
}

/// Every `<loc>` value in document order, with XML entities decoded.
pub fn extract_locations(xml: &str) -> Vec<String> {
    loc_pattern()
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
        .collect()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Derive name, folder and repository path from a URL's path segments.
///
/// `/` becomes `index.html`, `/about` becomes `about.html`, and `/gallery/lumora-25`
/// becomes `gallery/lumora-25.html` in folder `gallery`. A dot in the last segment
/// supplies the extension instead of `.html`. Returns `None` for unparseable URLs.
pub fn derive_candidate(raw_url: &str) -> Option<CandidatePage> {
    let url = Url::parse(raw_url).ok()?;

    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (folder_path, folder_name, file_name) = match segments.as_slice() {
        [] => (None, None, "index"),
        [only] => (None, None, *only),
        [parents @ .., parent, last] => {
            let mut folder = parents.to_vec();
            folder.push(*parent);
            (Some(folder.join("/")), Some(parent.to_string()), *last)
        }
    };

    let (name, extension) = match file_name.rsplit_once('.') {
        Some((base, ext)) => (base.to_string(), format!(".{}", ext)),
        None => (file_name.to_string(), DEFAULT_EXTENSION.to_string()),
    };

    let file_path = match &folder_path {
        Some(folder) => format!("{}/{}{}", folder, name, extension),
        None => format!("{}{}", name, extension),
    };

    Some(CandidatePage {
        url: raw_url.to_string(),
        name,
        folder_path,
        folder_name,
        file_path,
        file_extension: extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_about_and_nested() {
        let root = derive_candidate("https://x.com/").unwrap();
        assert_eq!(root.name, "index");
        assert_eq!(root.file_path, "index.html");
        assert_eq!(root.folder_path, None);

        let about = derive_candidate("https://x.com/about").unwrap();
        assert_eq!(about.file_path, "about.html");
        assert_eq!(about.folder_name, None);

        let nested = derive_candidate("https://x.com/gallery/lumora-25").unwrap();
        assert_eq!(nested.file_path, "gallery/lumora-25.html");
        assert_eq!(nested.folder_path.as_deref(), Some("gallery"));
        assert_eq!(nested.folder_name.as_deref(), Some("gallery"));
    }

    #[test]
    fn test_extension_taken_from_last_segment() {
        let page = derive_candidate("https://x.com/docs/readme.md").unwrap();
        assert_eq!(page.name, "readme");
        assert_eq!(page.file_extension, ".md");
        assert_eq!(page.file_path, "docs/readme.md");

        let page = derive_candidate("https://x.com/archive.tar.gz").unwrap();
        assert_eq!(page.name, "archive.tar");
        assert_eq!(page.file_extension, ".gz");
    }

    #[test]
    fn test_folder_name_is_immediate_parent() {
        let page = derive_candidate("https://x.com/a/b/c/page/").unwrap();
        assert_eq!(page.folder_path.as_deref(), Some("a/b/c"));
        assert_eq!(page.folder_name.as_deref(), Some("c"));
        assert_eq!(page.file_path, "a/b/c/page.html");
    }

    #[test]
    fn test_empty_segments_ignored() {
        let page = derive_candidate("https://x.com//blog//post").unwrap();
        assert_eq!(page.file_path, "blog/post.html");
    }

    #[test]
    fn test_query_does_not_affect_path() {
        let page = derive_candidate("https://x.com/shop?item=4").unwrap();
        assert_eq!(page.file_path, "shop.html");
        assert_eq!(page.url, "https://x.com/shop?item=4");
    }

    #[test]
    fn test_invalid_url_dropped() {
        assert!(derive_candidate("/relative/path").is_none());
        assert!(derive_candidate("").is_none());
    }

    #[test]
    fn test_derivation_invariants() {
        for url in [
            "https://x.com/",
            "https://x.com/about",
            "https://x.com/a/b/c.txt",
            "https://x.com/a/b/",
        ] {
            let page = derive_candidate(url).unwrap();
            assert!(!page.file_path.starts_with('/'));
            assert!(page.file_path.ends_with(&page.file_extension));
            assert_eq!(page.file_extension.matches('.').count(), 1);

            let rebuilt = match &page.folder_path {
                Some(folder) => format!("{}/{}{}", folder, page.name, page.file_extension),
                None => format!("{}{}", page.name, page.file_extension),
            };
            assert_eq!(rebuilt, page.file_path);
            assert_eq!(derive_candidate(url), Some(page));
        }
    }

    #[test]
    fn test_extract_locations() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://x.com/</loc></url>
  <url><loc>https://x.com/about</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://x.com/search?q=a&amp;b=c </loc></url>
  <url><sm:loc>https://x.com/ns</sm:loc></url>
  <url>
    <loc>
      https://x.com/pretty
    </loc>
  </url>
  <broken <unclosed
</urlset>"#;
        assert_eq!(
            extract_locations(xml),
            vec![
                "https://x.com/",
                "https://x.com/about",
                "https://x.com/search?q=a&b=c",
                "https://x.com/ns",
                "https://x.com/pretty",
            ]
        );
    }

    #[test]
    fn test_extract_locations_none() {
        assert!(extract_locations("<html><body>nope</body></html>").is_empty());
    }
}
