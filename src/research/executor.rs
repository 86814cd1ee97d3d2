//! Execution stage: one search per sub-task, results accumulated in order.
//!
//! Sub-tasks are independent, so they may run concurrently. Either way the
//! branch updates are merged in ascending sub-task id, which keeps
//! `all_sources` grouped by sub-task rather than interleaved.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::state::{ResearchState, ResearchUpdate, SubTask, SubagentResult};
use crate::search::{filter_sources, SearchClient, MAX_CONTENT_CHARS};

/// Results requested per sub-task in the interactive flow.
pub const DEFAULT_RESULTS_PER_SUBTASK: usize = 2;

/// How sub-tasks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One sub-task at a time, in id order
    #[default]
    Sequential,
    /// All sub-tasks at once, merged in id order
    Concurrent,
}

/// Subagent execution.
pub struct Executor {
    search: Arc<dyn SearchClient>,
    results_per_subtask: usize,
    max_chars: usize,
    mode: ExecutionMode,
}

impl Executor {
    pub fn new(search: Arc<dyn SearchClient>) -> Self {
        Self {
            search,
            results_per_subtask: DEFAULT_RESULTS_PER_SUBTASK,
            max_chars: MAX_CONTENT_CHARS,
            mode: ExecutionMode::default(),
        }
    }

    pub fn with_results_per_subtask(mut self, n: usize) -> Self {
        self.results_per_subtask = n;
        self
    }

    /// Characters requested per result; also the truncation limit for kept sources.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Stage entry point: execute the state's planned sub-tasks.
    pub async fn run(&self, state: &ResearchState) -> ResearchUpdate {
        self.execute(&state.subtasks).await
    }

    /// Search for every sub-task and merge the per-sub-task updates.
    ///
    /// A failed search yields an empty source list for that sub-task only.
    pub async fn execute(&self, subtasks: &[SubTask]) -> ResearchUpdate {
        let mut ordered: Vec<&SubTask> = subtasks.iter().collect();
        ordered.sort_by_key(|s| s.id);

        info!(mode = ?self.mode, subtasks = ordered.len(), "Subagent execution");

        let updates = match self.mode {
            ExecutionMode::Sequential => {
                let mut updates = Vec::with_capacity(ordered.len());
                for subtask in ordered {
                    updates.push(self.run_subtask(subtask).await);
                }
                updates
            }
            // join_all yields outputs in input order, which is already id order.
            ExecutionMode::Concurrent => join_all(ordered.into_iter().map(|s| self.run_subtask(s))).await,
        };

        let merged = ResearchState::merge_updates(updates);
        info!(total_sources = merged.all_sources.len(), "Total sources collected");
        merged
    }

    async fn run_subtask(&self, subtask: &SubTask) -> ResearchUpdate {
        info!(
            subtask = subtask.id,
            focus = %subtask.focus,
            query = %subtask.search_query,
            "Subagent searching"
        );

        let (sources, error) = match self
            .search
            .search(&subtask.search_query, self.results_per_subtask, self.max_chars)
            .await
        {
            Ok(documents) => (filter_sources(documents, self.max_chars), None),
            Err(e) => {
                warn!(subtask = subtask.id, provider = self.search.name(), error = %e, "Search failed");
                (
                    Vec::new(),
                    Some(format!(
                        "Search error for subtask {} ({}): {}",
                        subtask.id, subtask.focus, e
                    )),
                )
            }
        };

        info!(subtask = subtask.id, count = sources.len(), "Found sources");

        let update = ResearchUpdate::with_result(SubagentResult::new(subtask, sources));
        match error {
            Some(error) => update.with_error(error),
            None => update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::research::state::Focus;
    use crate::search::SearchDocument;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns documents named after the query; fails for queries containing "fail".
    struct EchoSearch {
        calls: Mutex<Vec<(String, usize, usize)>>,
        delay_first: bool,
    }

    impl EchoSearch {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                delay_first: false,
            }
        }
    }

    #[async_trait]
    impl SearchClient for EchoSearch {
        async fn search(
            &self,
            query: &str,
            num_results: usize,
            max_chars: usize,
        ) -> Result<Vec<SearchDocument>, SearchError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), num_results, max_chars));

            if self.delay_first && query == "a" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if query.contains("fail") {
                return Err(SearchError::Timeout);
            }

            Ok((0..num_results)
                .map(|i| {
                    SearchDocument::new(
                        format!("{}-{}", query, i),
                        format!("https://{}.example/{}", query, i),
                        "x".repeat(300),
                    )
                })
                .collect())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn subtasks(queries: [&str; 3]) -> Vec<SubTask> {
        Focus::ALL
            .iter()
            .zip(queries)
            .map(|(focus, q)| SubTask::new(*focus, q))
            .collect()
    }

    fn titles(update: &ResearchUpdate) -> Vec<&str> {
        update.all_sources.iter().map(|s| s.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sequential_execution_order_and_caps() {
        let search = Arc::new(EchoSearch::new());
        let executor = Executor::new(search.clone());

        let update = executor.execute(&subtasks(["a", "b", "c"])).await;

        assert_eq!(titles(&update), vec!["a-0", "a-1", "b-0", "b-1", "c-0", "c-1"]);
        assert_eq!(update.subagent_results.len(), 3);
        assert!(update.subagent_results.iter().all(|r| r.source_count == 2));
        assert!(update.errors.is_empty());

        let calls = search.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, n, chars)| *n == 2 && *chars == 1000));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_subtask() {
        let executor = Executor::new(Arc::new(EchoSearch::new()));

        let update = executor.execute(&subtasks(["a", "fail", "c"])).await;

        assert_eq!(update.subagent_results.len(), 3);
        assert_eq!(update.subagent_results[1].source_count, 0);
        assert_eq!(titles(&update), vec!["a-0", "a-1", "c-0", "c-1"]);
        assert_eq!(update.errors.len(), 1);
        assert!(update.errors[0].contains("subtask 2 (Trends)"));
    }

    #[tokio::test]
    async fn test_input_order_normalized_by_id() {
        let executor = Executor::new(Arc::new(EchoSearch::new()));
        let mut tasks = subtasks(["a", "b", "c"]);
        tasks.reverse();

        let update = executor.execute(&tasks).await;

        let ids: Vec<_> = update.subagent_results.iter().map(|r| r.subtask_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential_order() {
        let search = Arc::new(EchoSearch {
            calls: Mutex::new(Vec::new()),
            delay_first: true,
        });
        let executor = Executor::new(search).with_mode(ExecutionMode::Concurrent);

        let update = executor.execute(&subtasks(["a", "b", "c"])).await;

        assert_eq!(titles(&update), vec!["a-0", "a-1", "b-0", "b-1", "c-0", "c-1"]);
    }

    #[tokio::test]
    async fn test_custom_caps() {
        let search = Arc::new(EchoSearch::new());
        let executor = Executor::new(search.clone())
            .with_results_per_subtask(1)
            .with_max_chars(500);

        let update = executor.execute(&subtasks(["a", "b", "c"])).await;

        assert_eq!(update.all_sources.len(), 3);
        assert!(search
            .calls
            .lock()
            .unwrap()
            .iter()
            .all(|(_, n, chars)| *n == 1 && *chars == 500));
    }

    #[tokio::test]
    async fn test_max_chars_also_truncates_sources() {
        let executor = Executor::new(Arc::new(EchoSearch::new())).with_max_chars(250);

        let update = executor.execute(&subtasks(["a", "b", "c"])).await;

        assert_eq!(update.all_sources.len(), 6);
        assert!(update
            .all_sources
            .iter()
            .all(|s| s.content.chars().count() == 250));
    }

    #[tokio::test]
    async fn test_no_subtasks() {
        let executor = Executor::new(Arc::new(EchoSearch::new()));
        let update = executor.execute(&[]).await;
        assert!(update.is_empty());
    }
}
