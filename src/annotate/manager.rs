use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::annotate::store::ResultStore;
use crate::llm::Answerer;
use crate::table::{Row, TableView, ANSWER_PREFIX};

pub const NO_ABSTRACT: &str = "No abstract available";
pub const NO_ANSWER: &str = "No answer";

/// Characters of the question kept in the answer column name.
const QUESTION_PREFIX_CHARS: usize = 50;

/// Owned handle to a submitted annotation job. Dropping it detaches the job.
pub struct TaskHandle {
    task_id: String,
    total: usize,
    job: JoinHandle<()>,
}

impl TaskHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.job.is_finished()
    }

    /// Wait for the job to store its result.
    pub async fn join(self) -> anyhow::Result<()> {
        self.job
            .await
            .with_context(|| format!("Annotation job {} did not finish", self.task_id))
    }
}

/// Runs annotation jobs and records their progress in a [`ResultStore`].
#[derive(Clone)]
pub struct AnnotationManager {
    store: Arc<ResultStore>,
    max_concurrency: usize,
}

impl AnnotationManager {
    pub fn new(store: Arc<ResultStore>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Create a task for `view` and start answering `question` for every row
    /// in the background. Must be called inside a tokio runtime.
    ///
    /// `view` is the already-filtered selection; the task's result is a copy
    /// of it with one answer column appended.
    pub fn submit(
        &self,
        view: TableView,
        question: &str,
        answerer: Arc<dyn Answerer>,
        concurrency: usize,
    ) -> TaskHandle {
        let concurrency = concurrency.clamp(1, self.max_concurrency);
        let created_at = Utc::now();
        let task_id = task_id_for(question, created_at);
        let total = view.len();

        self.store.create_task(&task_id, question, total, created_at);
        tracing::info!("Annotation task {task_id} started: {total} rows, {concurrency} threads");

        let job = tokio::spawn(run_job(
            self.store.clone(),
            task_id.clone(),
            view,
            question.to_string(),
            answerer,
            concurrency,
        ));

        TaskHandle {
            task_id,
            total,
            job,
        }
    }
}

/// Task id: hex BLAKE3 digest of the question and creation time.
pub fn task_id_for(question: &str, created_at: DateTime<Utc>) -> String {
    let seed = format!("{question}{}", created_at.to_rfc3339());
    let digest = blake3::hash(seed.as_bytes()).to_hex();
    digest.as_str()[..32].to_string()
}

/// Column holding the answers to `question`.
pub fn answer_column_name(question: &str) -> String {
    let prefix: String = question.chars().take(QUESTION_PREFIX_CHARS).collect();
    format!("{ANSWER_PREFIX} {prefix}...")
}

/// Split `total` rows into contiguous batches of `total / concurrency` rows
/// (at least one). Leftover rows go to the final batch.
pub fn split_batches(total: usize, concurrency: usize) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let batch_size = (total / concurrency.max(1)).max(1);
    let count = total / batch_size;

    (0..count)
        .map(|i| {
            let start = i * batch_size;
            let end = if i + 1 == count {
                total
            } else {
                start + batch_size
            };
            start..end
        })
        .collect()
}

async fn run_job(
    store: Arc<ResultStore>,
    task_id: String,
    view: TableView,
    question: String,
    answerer: Arc<dyn Answerer>,
    concurrency: usize,
) {
    let TableView { columns, rows } = view;
    let rows = Arc::new(rows);
    let question = Arc::new(question);
    let task_id = Arc::new(task_id);

    let batches = split_batches(rows.len(), concurrency);
    let workers = concurrency.min(batches.len()).max(1);
    let semaphore = Arc::new(Semaphore::new(workers));

    let mut handles = Vec::with_capacity(batches.len());
    for range in batches {
        let store = store.clone();
        let rows = rows.clone();
        let question = question.clone();
        let task_id = task_id.clone();
        let answerer = answerer.clone();
        let sem = semaphore.clone();
        let counted = Arc::new(AtomicUsize::new(0));
        let batch_len = range.len();

        let job = tokio::spawn({
            let counted = counted.clone();
            async move {
                let _permit = sem.acquire_owned().await;
                process_batch(
                    &store,
                    &task_id,
                    &rows[range],
                    answerer.as_ref(),
                    &question,
                    &counted,
                )
                .await
            }
        });
        handles.push((batch_len, counted, job));
    }

    let mut answers: HashMap<usize, String> = HashMap::with_capacity(rows.len());
    for (batch_len, counted, job) in handles {
        match job.await {
            Ok(batch) => answers.extend(batch),
            Err(e) => {
                // Rows the dead batch never reached are finished with NO_ANSWER.
                let missing = batch_len.saturating_sub(counted.load(Ordering::Acquire));
                tracing::error!(
                    "Annotation batch for task {task_id} failed, {missing} rows unanswered: {e}"
                );
                store.record_completions(&task_id, missing);
            }
        }
    }

    let rows = Arc::try_unwrap(rows).unwrap_or_else(|shared| (*shared).clone());
    let mut result = TableView { columns, rows };
    result.push_column(&answer_column_name(&question), |row| {
        answers
            .remove(&row.index())
            .unwrap_or_else(|| NO_ANSWER.to_string())
    });

    let total = result.len();
    if store.store(&task_id, result) {
        tracing::info!("Annotation task {task_id} completed: {total} rows");
    } else {
        tracing::warn!("Annotation task {task_id} expired before completing; result dropped");
    }
}

/// Answer every row of one batch in order, counting each row once.
async fn process_batch(
    store: &ResultStore,
    task_id: &str,
    rows: &[Row],
    answerer: &dyn Answerer,
    question: &str,
    counted: &AtomicUsize,
) -> Vec<(usize, String)> {
    let mut results = Vec::with_capacity(rows.len());

    for row in rows {
        let text = row.record.abstract_text.as_str();
        let answer = if text.is_empty() {
            NO_ABSTRACT.to_string()
        } else {
            match answerer.answer(text, question).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!("Row {} of task {task_id} failed: {e:#}", row.index());
                    format!("Error: {e:#}")
                }
            }
        };

        store.record_completion(task_id);
        counted.fetch_add(1, Ordering::Release);
        results.push((row.index(), answer));
    }

    results
}
