use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::table::TableView;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Completed,
}

/// Progress of one annotation task, as reported to pollers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskProgress {
    pub total: usize,
    pub completed: usize,
    pub status: TaskStatus,
    pub question: String,
}

#[derive(Default)]
struct Maps {
    progress: HashMap<String, TaskProgress>,
    results: HashMap<String, Arc<TableView>>,
    created: HashMap<String, DateTime<Utc>>,
}

impl Maps {
    fn remove(&mut self, task_id: &str) {
        self.progress.remove(task_id);
        self.results.remove(task_id);
        self.created.remove(task_id);
    }
}

/// Task progress, finished results and creation times.
///
/// All three maps sit behind one lock: a task is either fully present or
/// fully absent to every reader.
pub struct ResultStore {
    maps: Mutex<Maps>,
    retention: Duration,
}

impl ResultStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            maps: Mutex::new(Maps::default()),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Register a running task with no completed rows.
    pub fn create_task(
        &self,
        task_id: &str,
        question: &str,
        total: usize,
        created_at: DateTime<Utc>,
    ) {
        let mut maps = self.maps.lock();
        maps.progress.insert(
            task_id.to_string(),
            TaskProgress {
                total,
                completed: 0,
                status: TaskStatus::Running,
                question: question.to_string(),
            },
        );
        maps.results.remove(task_id);
        maps.created.insert(task_id.to_string(), created_at);
    }

    /// Count one processed row. Returns the new completed count, or `None`
    /// if the task is unknown or every row was already counted.
    pub fn record_completion(&self, task_id: &str) -> Option<usize> {
        self.record_completions(task_id, 1)
    }

    /// Count `rows` processed rows at once. A count that would pass the
    /// task's total is refused and leaves progress unchanged.
    pub fn record_completions(&self, task_id: &str, rows: usize) -> Option<usize> {
        let mut maps = self.maps.lock();
        let progress = maps.progress.get_mut(task_id)?;
        match progress
            .completed
            .checked_add(rows)
            .filter(|next| *next <= progress.total)
        {
            Some(next) => {
                progress.completed = next;
                Some(next)
            }
            None => {
                tracing::warn!(
                    "Task {task_id} counted {rows} rows past {} of {}",
                    progress.completed,
                    progress.total
                );
                None
            }
        }
    }

    /// Store the finished table and mark the task completed. Progress is
    /// left as counted.
    ///
    /// Returns `false` when the task was swept while it ran; the table is
    /// dropped in that case.
    pub fn store(&self, task_id: &str, table: TableView) -> bool {
        let mut maps = self.maps.lock();
        let Some(progress) = maps.progress.get_mut(task_id) else {
            return false;
        };
        progress.status = TaskStatus::Completed;
        maps.results.insert(task_id.to_string(), Arc::new(table));
        true
    }

    pub fn get(&self, task_id: &str) -> Option<Arc<TableView>> {
        self.maps.lock().results.get(task_id).cloned()
    }

    pub fn progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.maps.lock().progress.get(task_id).cloned()
    }

    pub fn created_at(&self, task_id: &str) -> Option<DateTime<Utc>> {
        self.maps.lock().created.get(task_id).copied()
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.maps.lock().created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every task created more than the retention window before `now`.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut maps = self.maps.lock();
        let expired: Vec<String> = maps
            .created
            .iter()
            .filter(|(_, created)| now - **created > self.retention)
            .map(|(id, _)| id.clone())
            .collect();

        for task_id in &expired {
            maps.remove(task_id);
            tracing::info!("Cleaned up expired annotation task {task_id}");
        }

        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ResultStore {
        ResultStore::new(Duration::hours(24))
    }

    #[test]
    fn test_create_task_starts_running_at_zero() {
        let store = store();
        store.create_task("t1", "Is it phase 3?", 4, Utc::now());
        let progress = store.progress("t1").unwrap();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.status, TaskStatus::Running);
        assert!(store.get("t1").is_none());
    }

    #[test]
    fn test_record_completion_never_exceeds_total() {
        let store = store();
        store.create_task("t1", "q", 2, Utc::now());
        assert_eq!(store.record_completion("t1"), Some(1));
        assert_eq!(store.record_completion("t1"), Some(2));
        assert_eq!(store.record_completion("t1"), None);
        assert_eq!(store.progress("t1").unwrap().completed, 2);
        assert_eq!(store.record_completion("missing"), None);
    }

    #[test]
    fn test_record_completions_refuses_overcount() {
        let store = store();
        store.create_task("t1", "q", 5, Utc::now());
        assert_eq!(store.record_completions("t1", 3), Some(3));
        assert_eq!(store.record_completions("t1", 3), None);
        assert_eq!(store.record_completions("t1", 2), Some(5));
        assert_eq!(store.record_completions("t1", usize::MAX), None);
        assert_eq!(store.progress("t1").unwrap().completed, 5);
    }

    #[test]
    fn test_store_keeps_counted_progress() {
        let store = store();
        store.create_task("t1", "q", 3, Utc::now());
        store.record_completion("t1");
        assert!(store.store("t1", TableView::default()));

        let progress = store.progress("t1").unwrap();
        assert_eq!(progress.status, TaskStatus::Completed);
        assert_eq!(progress.completed, 1);
    }

    #[test]
    fn test_store_completes_task() {
        let store = store();
        store.create_task("t1", "q", 0, Utc::now());
        assert!(store.store("t1", TableView::default()));
        assert_eq!(store.progress("t1").unwrap().status, TaskStatus::Completed);
        assert!(store.get("t1").is_some());
        assert!(!store.store("unknown", TableView::default()));
        assert!(store.get("unknown").is_none());
    }

    #[test]
    fn test_sweep_removes_expired_from_every_map() {
        let store = store();
        let now = Utc::now();
        store.create_task("old", "q", 1, now - Duration::hours(25));
        store.create_task("fresh", "q", 1, now - Duration::hours(1));
        store.store("old", TableView::default());
        store.store("fresh", TableView::default());

        assert_eq!(store.sweep(now), 1);

        assert!(store.progress("old").is_none());
        assert!(store.get("old").is_none());
        assert!(store.created_at("old").is_none());
        assert!(store.progress("fresh").is_some());
        assert!(store.get("fresh").is_some());
        assert_eq!(store.len(), 1);

        assert_eq!(store.sweep(now), 0);
    }

    #[test]
    fn test_serializes_status_in_snake_case() {
        let progress = TaskProgress {
            total: 1,
            completed: 1,
            status: TaskStatus::Completed,
            question: "q".to_string(),
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["status"], "completed");
    }
}
