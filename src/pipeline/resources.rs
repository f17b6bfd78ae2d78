//! Resource augmentation: search query → "Recommended Resources" markdown.
//!
//! The two category lookups (videos, web articles) are issued concurrently
//! and each outcome is handled on its own — an error on one side never
//! blocks or discards the other. Nothing in this module can fail the
//! pipeline: every degraded condition (missing credential, network error,
//! zero hits) renders as a placeholder line inside the section instead.

use async_trait::async_trait;
use futures::join;
use tracing::{info, warn};

use crate::error::StudyGuideError;
use crate::state::{ResourceEntry, ResourceKind};

/// Section header appended after the generated study-guide body.
pub const RESOURCES_HEADER: &str = "\n\n## 📚 Recommended Resources\n";

const CONFIG_MISSING_LINE: &str =
    "*   **Configuration Missing** - Please set `SERPER_API_KEY` to enable resource search.\n";
const LOOKUP_FAILED_LINE: &str = "*   *Failed to load resources. Please try again later.*\n";

/// The remote search call, one category at a time.
#[async_trait]
pub trait ResourceSearch: Send + Sync {
    /// Look up at most `limit` resources of the given kind.
    async fn search(
        &self,
        query: &str,
        kind: ResourceKind,
        limit: usize,
    ) -> Result<Vec<ResourceEntry>, StudyGuideError>;
}

/// Build the "Recommended Resources" markdown section for `query`.
///
/// `search` is `None` when no search credential is configured; that skips
/// the lookups entirely and emits a configuration-missing placeholder.
/// Lookup failures are logged and collapsed into a single failure line
/// (one line even when both categories fail).
pub async fn augment(
    search: Option<&dyn ResourceSearch>,
    query: &str,
    per_kind: usize,
) -> String {
    let Some(search) = search else {
        info!("search credential absent; skipping resource lookup");
        return format!("{RESOURCES_HEADER}{CONFIG_MISSING_LINE}");
    };

    info!(%query, "fetching recommended resources");
    let (videos, articles) = join!(
        search.search(query, ResourceKind::Video, per_kind),
        search.search(query, ResourceKind::Article, per_kind),
    );

    let mut md = String::from(RESOURCES_HEADER);
    let mut failure_noted = false;
    render_category(&mut md, videos, ResourceKind::Video, per_kind, &mut failure_noted);
    render_category(&mut md, articles, ResourceKind::Article, per_kind, &mut failure_noted);
    md
}

fn render_category(
    md: &mut String,
    outcome: Result<Vec<ResourceEntry>, StudyGuideError>,
    kind: ResourceKind,
    per_kind: usize,
    failure_noted: &mut bool,
) {
    match outcome {
        Ok(entries) if !entries.is_empty() => {
            for entry in entries.iter().take(per_kind) {
                md.push_str(&render_entry(entry));
            }
        }
        Ok(_) => md.push_str(empty_category_line(kind)),
        Err(e) => {
            warn!(?kind, error = %e, "resource lookup failed");
            if !*failure_noted {
                md.push_str(LOOKUP_FAILED_LINE);
                *failure_noted = true;
            }
        }
    }
}

fn render_entry(entry: &ResourceEntry) -> String {
    let label = match entry.kind {
        ResourceKind::Video => "Video",
        ResourceKind::Article => "Article",
    };
    format!("*   **[{label}] {}** - [Link]({})\n", entry.title, entry.url)
}

fn empty_category_line(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Video => "*   *No specific videos found for this topic.*\n",
        ResourceKind::Article => "*   *No specific articles found for this topic.*\n",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(kind: ResourceKind, title: &str) -> ResourceEntry {
        ResourceEntry {
            kind,
            title: title.into(),
            url: format!("https://example.org/{}", title.replace(' ', "-")),
        }
    }

    /// Mock search returning canned per-kind outcomes and counting calls.
    struct CannedSearch {
        videos: Result<Vec<ResourceEntry>, ()>,
        articles: Result<Vec<ResourceEntry>, ()>,
        calls: AtomicUsize,
    }

    impl CannedSearch {
        fn new(
            videos: Result<Vec<ResourceEntry>, ()>,
            articles: Result<Vec<ResourceEntry>, ()>,
        ) -> Self {
            Self {
                videos,
                articles,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResourceSearch for CannedSearch {
        async fn search(
            &self,
            _query: &str,
            kind: ResourceKind,
            _limit: usize,
        ) -> Result<Vec<ResourceEntry>, StudyGuideError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = match kind {
                ResourceKind::Video => &self.videos,
                ResourceKind::Article => &self.articles,
            };
            outcome
                .clone()
                .map_err(|_| StudyGuideError::SearchFailed { reason: "503".into() })
        }
    }

    #[tokio::test]
    async fn missing_credential_emits_config_line_only() {
        let md = augment(None, "Binary Search Trees", 3).await;
        assert!(md.contains("## 📚 Recommended Resources"));
        assert!(md.contains(
            "**Configuration Missing** - Please set `SERPER_API_KEY` to enable resource search."
        ));
        assert!(!md.contains("[Video]"));
        assert!(!md.contains("[Article]"));
    }

    #[tokio::test]
    async fn zero_videos_two_articles() {
        let search = CannedSearch::new(
            Ok(vec![]),
            Ok(vec![
                entry(ResourceKind::Article, "BST Tutorial"),
                entry(ResourceKind::Article, "Tree Rotations"),
            ]),
        );
        let md = augment(Some(&search), "Binary Search Trees", 3).await;

        assert_eq!(
            md.matches("No specific videos found").count(),
            1,
            "exactly one video placeholder:\n{md}"
        );
        assert_eq!(md.matches("**[Article]").count(), 2);
        // Service order preserved
        let first = md.find("BST Tutorial").unwrap();
        let second = md.find("Tree Rotations").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn entries_render_in_the_expected_format() {
        let search = CannedSearch::new(
            Ok(vec![entry(ResourceKind::Video, "Intro to BSTs")]),
            Ok(vec![]),
        );
        let md = augment(Some(&search), "q", 3).await;
        assert!(md.contains(
            "*   **[Video] Intro to BSTs** - [Link](https://example.org/Intro-to-BSTs)\n"
        ));
        assert!(md.contains("No specific articles found"));
    }

    #[tokio::test]
    async fn entries_are_capped_per_kind() {
        let many: Vec<_> = (0..5)
            .map(|i| entry(ResourceKind::Video, &format!("Video {i}")))
            .collect();
        let search = CannedSearch::new(Ok(many), Ok(vec![]));
        let md = augment(Some(&search), "q", 3).await;
        assert_eq!(md.matches("**[Video]").count(), 3);
    }

    #[tokio::test]
    async fn one_failed_lookup_keeps_the_other_category() {
        let search = CannedSearch::new(
            Err(()),
            Ok(vec![entry(ResourceKind::Article, "Survivor")]),
        );
        let md = augment(Some(&search), "q", 3).await;
        assert_eq!(md.matches("Failed to load resources").count(), 1);
        assert!(md.contains("**[Article] Survivor**"));
    }

    #[tokio::test]
    async fn both_failures_collapse_to_one_line() {
        let search = CannedSearch::new(Err(()), Err(()));
        let md = augment(Some(&search), "q", 3).await;
        assert_eq!(md.matches("Failed to load resources").count(), 1);
        assert!(!md.contains("[Video]"));
    }

    #[tokio::test]
    async fn both_lookups_are_issued() {
        let search = CannedSearch::new(Ok(vec![]), Ok(vec![]));
        let _ = augment(Some(&search), "q", 3).await;
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    }
}
