//! In-memory conversation checkpoints.
//!
//! Each completed turn's final state is saved under the session's thread id.
//! Nothing outlives the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::research::ResearchState;

/// The final state of one turn of a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: String,
    /// 1-based turn number within the thread
    pub turn: usize,
    pub state: ResearchState,
    pub timestamp: DateTime<Utc>,
}

/// Checkpoints keyed by thread id.
#[derive(Debug, Default)]
pub struct MemoryCheckpointer {
    threads: RwLock<HashMap<String, Vec<Checkpoint>>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `state` as the next turn of `thread_id` and return its turn number.
    pub async fn save(&self, thread_id: &str, state: ResearchState) -> usize {
        let mut threads = self.threads.write().await;
        let history = threads.entry(thread_id.to_string()).or_default();
        let turn = history.len() + 1;

        history.push(Checkpoint {
            thread_id: thread_id.to_string(),
            turn,
            state,
            timestamp: Utc::now(),
        });

        turn
    }

    pub async fn latest(&self, thread_id: &str) -> Option<Checkpoint> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .and_then(|history| history.last().cloned())
    }

    pub async fn turns(&self, thread_id: &str) -> usize {
        self.threads
            .read()
            .await
            .get(thread_id)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_numbers_turns_per_thread() {
        let memory = MemoryCheckpointer::new();

        assert_eq!(memory.save("a", ResearchState::new("one")).await, 1);
        assert_eq!(memory.save("a", ResearchState::new("two")).await, 2);
        assert_eq!(memory.save("b", ResearchState::new("other")).await, 1);

        assert_eq!(memory.turns("a").await, 2);
        assert_eq!(memory.turns("b").await, 1);
        assert_eq!(memory.turns("missing").await, 0);
    }

    #[tokio::test]
    async fn test_latest() {
        let memory = MemoryCheckpointer::new();
        memory.save("t", ResearchState::new("first")).await;
        memory.save("t", ResearchState::new("second")).await;

        let latest = memory.latest("t").await.unwrap();
        assert_eq!(latest.turn, 2);
        assert_eq!(latest.state.query, "second");
        assert_eq!(latest.thread_id, "t");

        assert!(memory.latest("none").await.is_none());
    }
}
