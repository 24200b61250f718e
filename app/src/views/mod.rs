//! Terminal view models. Each holds its own local state and renders to
//! plain text; none of them performs I/O except through `TodoQueries`.

pub mod dialog;
pub mod form;
pub mod health_indicator;
pub mod item;
pub mod list;

pub use dialog::{ConfirmDialog, DialogAction, DialogVariant};
pub use form::{SubmitOutcome, TodoForm};
pub use health_indicator::{ConnectionStatus, HealthIndicator};
pub use item::{EditDraft, ItemMode, ItemOutcome, TodoItem};
pub use list::{Filter, FilterCounts, TodoList};
