// Queue reconciler - decides whether the URL queue is drained after a run

use tracing::{info, warn};

use super::errors::QueueError;
use super::models::RunResult;
use super::queue::UrlQueue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Every group succeeded; the queue file was wiped
    Cleared,
    /// At least one group failed; the queue is untouched
    Retained {
        failed_groups: Vec<String>,
        pending: Vec<String>,
    },
    /// No group ran at all
    NothingRan,
}

impl ReconcileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Cleared)
    }
}

/// Clear the queue only if `results` is non-empty and every run exited with 0
pub async fn reconcile(queue: &UrlQueue, results: &[RunResult]) -> Result<ReconcileOutcome, QueueError> {
    if results.is_empty() {
        warn!(target: "reconcile", "no groups ran; queue left unchanged");
        return Ok(ReconcileOutcome::NothingRan);
    }

    let failed_groups: Vec<String> = results
        .iter()
        .filter(|r| !r.succeeded())
        .map(|r| r.group.clone())
        .collect();

    if failed_groups.is_empty() {
        queue.clear().await?;
        info!(
            target: "reconcile",
            "all {} group(s) succeeded; cleared {}",
            results.len(),
            queue.path().display()
        );
        return Ok(ReconcileOutcome::Cleared);
    }

    let pending = queue.pending().await?;
    warn!(
        target: "reconcile",
        "{} of {} group(s) failed ({}); {} entr(ies) kept in {}",
        failed_groups.len(),
        results.len(),
        failed_groups.join(", "),
        pending.len(),
        queue.path().display()
    );
    for url in &pending {
        warn!(target: "reconcile", "pending: {}", url);
    }

    Ok(ReconcileOutcome::Retained {
        failed_groups,
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUE: &str = "# saved\nhttps://youtu.be/a\n\nhttps://youtu.be/b\n";

    async fn queue_in(dir: &tempfile::TempDir) -> UrlQueue {
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, QUEUE).unwrap();
        UrlQueue::load(&path).await.unwrap()
    }

    fn result(group: &str, code: i32) -> RunResult {
        RunResult::new(group, Some(code), String::new())
    }

    #[tokio::test]
    async fn test_all_success_clears_queue() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir).await;

        let outcome = reconcile(&queue, &[result("A", 0), result("B", 0)]).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Cleared);
        assert!(outcome.is_success());
        assert_eq!(std::fs::read_to_string(queue.path()).unwrap(), "");
    }

    #[tokio::test]
    async fn test_any_failure_keeps_queue() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir).await;

        let outcome = reconcile(&queue, &[result("A", 0), result("B", 1)]).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            ReconcileOutcome::Retained {
                failed_groups: vec!["B".to_string()],
                pending: vec!["https://youtu.be/a".to_string(), "https://youtu.be/b".to_string()],
            }
        );
        assert_eq!(std::fs::read_to_string(queue.path()).unwrap(), QUEUE);
    }

    #[tokio::test]
    async fn test_tool_missing_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir).await;

        let missing = RunResult::new("A", None, "Tool not found: yt-dlp".to_string());
        let outcome = reconcile(&queue, &[missing]).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Retained { .. }));
    }

    #[tokio::test]
    async fn test_empty_results_leave_queue() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_in(&dir).await;

        let outcome = reconcile(&queue, &[]).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::NothingRan);
        assert!(!outcome.is_success());
        assert_eq!(std::fs::read_to_string(queue.path()).unwrap(), QUEUE);
    }
}
