//! Run Discovery (C12): fuzzy-matches a task description against past
//! runs' theme descriptions. Grounded on
//! `original_source/src/frago/run/discovery.py`'s direct use of
//! `rapidfuzz.fuzz.{token_sort_ratio,partial_ratio,token_set_ratio}`;
//! ported to the published `rapidfuzz` Rust crate for scoring fidelity.

use frago_runs::{RunStatus, RunStore};

const DEFAULT_THRESHOLD: f64 = 60.0;
const DEFAULT_MAX_RESULTS: usize = 5;
const BEST_MATCH_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, serde::Serialize)]
pub struct DiscoveryMatch {
    pub run_id: String,
    pub theme_description: String,
    pub score: f64,
    pub last_accessed: chrono::DateTime<chrono::Utc>,
}

/// Highest of token-sort, partial, and token-set ratio, on a 0-100 scale.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let token_sort = rapidfuzz::fuzz::token_sort_ratio(a.chars(), b.chars(), None, None);
    let partial = rapidfuzz::fuzz::partial_ratio(a.chars(), b.chars(), None, None);
    let token_set = rapidfuzz::fuzz::token_set_ratio(a.chars(), b.chars(), None, None);
    token_sort.max(partial).max(token_set)
}

/// Matches `task_description` against every run's `theme_description`,
/// regardless of status. Returns matches scoring `>= threshold`, sorted
/// by `(score, last_accessed)` descending, capped at `max_results`.
pub fn discover_similar_runs(
    store: &RunStore,
    task_description: &str,
    threshold: Option<f64>,
    max_results: Option<usize>,
) -> Result<Vec<DiscoveryMatch>, frago_runs::RunError> {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
    let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let mut matches: Vec<DiscoveryMatch> = store
        .list_runs(None)?
        .into_iter()
        .map(|summary| DiscoveryMatch {
            score: similarity_score(task_description, &summary.instance.theme_description),
            run_id: summary.instance.run_id,
            theme_description: summary.instance.theme_description,
            last_accessed: summary.instance.last_accessed,
        })
        .filter(|m| m.score >= threshold)
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.last_accessed.cmp(&a.last_accessed))
    });
    matches.truncate(max_results);

    Ok(matches)
}

/// Single-result variant with a higher default threshold.
pub fn find_best_match(
    store: &RunStore,
    task_description: &str,
    threshold: Option<f64>,
) -> Result<Option<DiscoveryMatch>, frago_runs::RunError> {
    let threshold = threshold.unwrap_or(BEST_MATCH_THRESHOLD);
    let matches = discover_similar_runs(store, task_description, Some(threshold), Some(1))?;
    Ok(matches.into_iter().next())
}

/// Only considers active runs; archived runs are excluded from matching.
pub fn discover_similar_active_runs(
    store: &RunStore,
    task_description: &str,
    threshold: Option<f64>,
    max_results: Option<usize>,
) -> Result<Vec<DiscoveryMatch>, frago_runs::RunError> {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
    let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let mut matches: Vec<DiscoveryMatch> = store
        .list_runs(Some(RunStatus::Active))?
        .into_iter()
        .map(|summary| DiscoveryMatch {
            score: similarity_score(task_description, &summary.instance.theme_description),
            run_id: summary.instance.run_id,
            theme_description: summary.instance.theme_description,
            last_accessed: summary.instance.last_accessed,
        })
        .filter(|m| m.score >= threshold)
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.last_accessed.cmp(&a.last_accessed))
    });
    matches.truncate(max_results);

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn identical_strings_score_one_hundred() {
        assert!((similarity_score("upwork jobs search", "upwork jobs search") - 100.0).abs() < 1e-6);
    }

    #[test]
    fn reordered_tokens_still_score_highly() {
        let score = similarity_score("python jobs upwork search", "upwork search python jobs");
        assert!(score > 90.0, "expected token-sort-ratio to dominate, got {score}");
    }

    #[test]
    fn discover_similar_runs_filters_by_threshold_and_sorts() {
        let dir = tempdir().unwrap();
        let store = RunStore::new(dir.path());
        store.create_run("Upwork Python jobs search", Some("run-a")).unwrap();
        store.create_run("Completely unrelated theme about gardening", Some("run-b")).unwrap();

        let matches = discover_similar_runs(&store, "Upwork Python jobs search", None, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].run_id, "run-a");
    }

    #[test]
    fn find_best_match_returns_none_below_threshold() {
        let dir = tempdir().unwrap();
        let store = RunStore::new(dir.path());
        store.create_run("Completely unrelated theme", Some("run-a")).unwrap();

        let best = find_best_match(&store, "Upwork Python jobs search", None).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn archived_runs_excluded_from_active_discovery() {
        let dir = tempdir().unwrap();
        let store = RunStore::new(dir.path());
        store.create_run("Upwork Python jobs search", Some("run-a")).unwrap();
        store.archive_run("run-a").unwrap();

        let matches = discover_similar_active_runs(&store, "Upwork Python jobs search", None, None).unwrap();
        assert!(matches.is_empty());
    }
}
