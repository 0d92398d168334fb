use crate::url::paths::{listing_key, StorageKey};
use crate::UrlError;
use url::Url;

/// One listing page of the crawl target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// 1-based listing index
    pub index: u32,
    pub url: Url,
    pub key: StorageKey,
}

/// The fixed, ordered set of listing pages for one run
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    account: String,
    listings: Vec<ListingPage>,
}

impl CrawlTarget {
    /// Builds listing pages 1..=pages for `account` under `base_url`
    pub fn new(base_url: &Url, account: &str, pages: u32) -> Result<Self, UrlError> {
        let listings = (1..=pages)
            .map(|index| {
                Ok(ListingPage {
                    index,
                    url: listing_url(base_url, account, index)?,
                    key: listing_key(index),
                })
            })
            .collect::<Result<Vec<_>, UrlError>>()?;

        Ok(Self {
            account: account.to_string(),
            listings,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn listings(&self) -> &[ListingPage] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Builds the URL of a listing page
///
/// Index 1 also carries the `/page/1/` suffix so every listing URL has the
/// same shape.
///
/// ```
/// use review_mirror::url::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.test").unwrap();
/// let url = listing_url(&base, "alice", 1).unwrap();
/// assert_eq!(url.as_str(), "https://example.test/alice/films/reviews/page/1/");
/// ```
pub fn listing_url(base_url: &Url, account: &str, index: u32) -> Result<Url, UrlError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(&format!("{}/films/reviews/page/{}/", account, index))
        .map_err(|e| UrlError::Parse(e.to_string()))
}
