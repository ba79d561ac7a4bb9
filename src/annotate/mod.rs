//! Background annotation jobs and their expiring result store.

pub mod manager;
pub mod store;

pub use manager::{answer_column_name, AnnotationManager, TaskHandle, NO_ABSTRACT, NO_ANSWER};
pub use store::{ResultStore, TaskProgress, TaskStatus};
