//! Storage key mapping
//!
//! Every captured page is written under a key derived only from its URL (or,
//! for listing pages, from its 1-based listing index). The same input always
//! yields the same key, so a recapture overwrites the earlier file.

use crate::UrlError;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Name of the file that terminates every storage key
const INDEX_FILE: &str = "index";

/// Deterministic, slash-separated location of a captured page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut key: Vec<&str> = segments.into_iter().collect();
        key.push(INDEX_FILE);
        Self(key.join("/"))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the directory components and the final file name
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Maps the key to a relative filesystem path, appending `extension` to
    /// the final component (`alice/film/dune/index` -> `alice/film/dune/index.html`)
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.segments().collect();
        if !extension.is_empty() {
            path.set_extension(extension);
        }
        path
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for the listing page with the given 1-based index
///
/// The index is supplied by the caller rather than parsed from the URL.
///
/// ```
/// use review_mirror::url::listing_key;
///
/// assert_eq!(listing_key(1).as_str(), "films/reviews/page_1/index");
/// ```
pub fn listing_key(index: u32) -> StorageKey {
    let page = format!("page_{}", index);
    StorageKey::from_segments(["films", "reviews", page.as_str()])
}

/// Key for a detail page: its path segments followed by `index`
///
/// Fails for URLs whose path is just `/`, which have no segment to mirror.
///
/// ```
/// use review_mirror::url::detail_key;
/// use url::Url;
///
/// let url = Url::parse("https://example.test/alice/film/inception/").unwrap();
/// assert_eq!(detail_key(&url).unwrap().as_str(), "alice/film/inception/index");
/// ```
pub fn detail_key(url: &Url) -> Result<StorageKey, UrlError> {
    let segments: Vec<&str> = url
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return Err(UrlError::EmptyPath(url.to_string()));
    }

    Ok(StorageKey::from_segments(segments))
}
