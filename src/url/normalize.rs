use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a page URL so that one page has exactly one frontier entry
///
/// # Normalization Steps
///
/// 1. Reject anything that is not HTTP or HTTPS
/// 2. Collapse repeated slashes in the path
/// 3. Guarantee a trailing slash on the path (`/film/dune` and
///    `/film/dune/` are the same page)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters and sort the remaining ones
/// 6. Remove an empty query string
///
/// Host lowercasing and dot-segment removal are already done by the
/// `url` parser.
///
/// # Examples
///
/// ```
/// use review_mirror::url::normalize_page_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.test/alice/film/dune#reviews").unwrap();
/// let normalized = normalize_page_url(&url).unwrap();
/// assert_eq!(normalized.as_str(), "https://example.test/alice/film/dune/");
/// ```
pub fn normalize_page_url(url: &Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let mut url = url.clone();

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let filtered_params = filter_and_sort_query_params(&url);

        if filtered_params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(filtered_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Ok(url)
}

/// Collapses empty segments and terminates the path with a slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}/", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
