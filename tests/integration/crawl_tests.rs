//! Integration tests for the crawler
//!
//! These tests drive the full two-phase run through `run_session` against
//! the in-memory site in `support` and check what lands on disk.

use crate::support::{detail_html, listing, listing_html, test_config, FakeSite, BASE};
use review_mirror::crawler::run_session;
use review_mirror::storage::FsStore;
use review_mirror::{CrawlPhase, MirrorError, PageState};
use std::fs;
use tempfile::TempDir;

fn detail(path: &str) -> String {
    format!("{}{}", BASE, path)
}

#[tokio::test(start_paused = true)]
async fn test_full_crawl_single_listing() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let listing_page = listing_html(&[
        "",
        "#top",
        "/alice/film/inception/",
        "https://other.test/x",
        "/alice/films/diary/",
        "javascript:void(0)",
    ]);
    let site = FakeSite::new()
        .with_page(&listing("alice", 1), &listing_page)
        .with_page(
            &detail("/alice/film/inception/"),
            &detail_html("Inception"),
        );

    let mut session = site.session();
    let report = run_session(&test_config("alice", 1), "hash", &mut session, &mut store)
        .await
        .unwrap();

    assert_eq!(report.captured(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.frontier_size, 1);

    let listing_file = dir.path().join("films/reviews/page_1/index.html");
    let detail_file = dir.path().join("alice/film/inception/index.html");
    assert_eq!(fs::read_to_string(listing_file).unwrap(), listing_page);
    assert_eq!(
        fs::read_to_string(detail_file).unwrap(),
        detail_html("Inception")
    );

    let detail_outcome = &report.outcomes[1];
    assert_eq!(detail_outcome.phase, CrawlPhase::Detail);
    assert_eq!(
        detail_outcome.storage_key.as_ref().unwrap().as_str(),
        "alice/film/inception/index"
    );
    assert_eq!(detail_outcome.title.as_deref(), Some("Inception"));

    assert_eq!(site.session_closes(), 1);
    assert_eq!(site.page_closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_frontier_dedupes_across_listings() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let dune = detail("/alice/film/dune/");
    let site = FakeSite::new()
        .with_page(
            &listing("alice", 1),
            &listing_html(&["/alice/film/dune/", "/alice/film/dune", "/alice/film/alien/"]),
        )
        .with_page(
            &listing("alice", 2),
            &listing_html(&[
                "https://example.test/alice/film/dune",
                "/alice/film/dune/#comments",
            ]),
        )
        .with_page(&dune, &detail_html("Dune"))
        .with_page(&detail("/alice/film/alien/"), &detail_html("Alien"));

    let mut session = site.session();
    let report = run_session(&test_config("alice", 2), "hash", &mut session, &mut store)
        .await
        .unwrap();

    assert_eq!(report.frontier_size, 2);
    assert_eq!(report.phase_counts(CrawlPhase::Detail), (2, 0));
    assert_eq!(site.navigations_to(&dune), 1);
}

#[tokio::test(start_paused = true)]
async fn test_detail_failure_is_isolated() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let paths = [
        "/alice/film/f1/",
        "/alice/film/f2/",
        "/alice/film/f3/",
        "/alice/film/f4/",
        "/alice/film/f5/",
    ];
    let mut site = FakeSite::new().with_page(&listing("alice", 1), &listing_html(&paths));
    for (i, path) in paths.iter().enumerate() {
        site = if i == 1 {
            site.with_unreachable(&detail(path))
        } else {
            site.with_page(&detail(path), &detail_html(path))
        };
    }

    let mut session = site.session();
    let report = run_session(&test_config("alice", 1), "hash", &mut session, &mut store)
        .await
        .unwrap();

    let details: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| o.phase == CrawlPhase::Detail)
        .collect();
    assert_eq!(details.len(), 5);

    let attempted: Vec<String> = details.iter().map(|o| o.url.clone()).collect();
    let expected: Vec<String> = paths.iter().map(|p| detail(p)).collect();
    assert_eq!(attempted, expected);

    assert_eq!(details[1].state, PageState::NavigationFailed);
    assert!(details[1].error.is_some());
    for outcome in [details[0], details[2], details[3], details[4]] {
        assert_eq!(outcome.state, PageState::Captured);
    }

    assert!(!dir.path().join("alice/film/f2/index.html").exists());
    assert!(dir.path().join("alice/film/f5/index.html").exists());
}

#[tokio::test(start_paused = true)]
async fn test_session_closed_when_page_cannot_open() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let site = FakeSite::new();

    let mut session = site.broken_session();
    let result = run_session(&test_config("alice", 1), "hash", &mut session, &mut store).await;

    assert!(matches!(result, Err(MirrorError::Browser(_))));
    assert_eq!(site.session_closes(), 1);
    assert!(site.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_session_closed_on_invalid_target() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let site = FakeSite::new();
    let mut config = test_config("alice", 1);
    config.target.base_url = "::not a url::".to_string();

    let mut session = site.session();
    let result = run_session(&config, "hash", &mut session, &mut store).await;

    assert!(result.is_err());
    assert_eq!(site.session_closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_listing_captured() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let site = FakeSite::new()
        .with_unreachable(&listing("alice", 1))
        .with_unreachable(&listing("alice", 2));

    let mut session = site.session();
    let report = run_session(&test_config("alice", 2), "hash", &mut session, &mut store)
        .await
        .unwrap();

    assert!(!report.listing_captured());
    assert_eq!(report.phase_counts(CrawlPhase::Discovery), (0, 2));
    assert_eq!(report.frontier_size, 0);
    assert_eq!(site.session_closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_recapture_overwrites_in_place() {
    let dir = TempDir::new().unwrap();
    let mut store = FsStore::new(dir.path(), "html");
    let dune = detail("/alice/film/dune/");
    let site = FakeSite::new()
        .with_page(&listing("alice", 1), &listing_html(&["/alice/film/dune/"]))
        .with_page(&dune, &detail_html("Dune"));
    let config = test_config("alice", 1);

    let mut session = site.session();
    run_session(&config, "hash", &mut session, &mut store)
        .await
        .unwrap();

    site.set_page(&dune, &detail_html("Dune: Part Two"));
    let mut session = site.session();
    run_session(&config, "hash", &mut session, &mut store)
        .await
        .unwrap();

    let film_dir = dir.path().join("alice/film/dune");
    let entries: Vec<_> = fs::read_dir(&film_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        fs::read_to_string(film_dir.join("index.html")).unwrap(),
        detail_html("Dune: Part Two")
    );
    assert_eq!(site.session_closes(), 2);
}
