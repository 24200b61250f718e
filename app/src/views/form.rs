//! Creation form.

use todo_core::{Todo, TodoRequest, ValidationError};
use tracing::error;

use crate::queries::{MutationState, TodoQueries};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The server accepted the todo; the form was cleared.
    Created(Option<Todo>),
    /// Rejected locally; no request was sent.
    Invalid(ValidationError),
    /// A create is already in flight.
    Busy,
    /// The request failed; the input is kept for resubmission.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct TodoForm {
    title: String,
    description: String,
    mutation: MutationState,
}

impl TodoForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mutation(&self) -> &MutationState {
        &self.mutation
    }

    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty() && !self.mutation.is_pending()
    }

    pub async fn submit(&mut self, queries: &TodoQueries) -> SubmitOutcome {
        if self.mutation.is_pending() {
            return SubmitOutcome::Busy;
        }
        let request = match TodoRequest::validated(&self.title, &self.description, Some(false)) {
            Ok(request) => request,
            Err(e) => return SubmitOutcome::Invalid(e),
        };

        self.mutation = MutationState::Pending;
        let result = queries.create(&request).await;
        self.mutation = MutationState::from_result(&result);
        match result {
            Ok(envelope) => {
                self.title.clear();
                self.description.clear();
                SubmitOutcome::Created(envelope.data)
            }
            Err(e) => {
                error!(title = %request.title, error = %e, "failed to create todo");
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn render(&self) -> String {
        let button = if self.mutation.is_pending() {
            "[Adding...]"
        } else if self.can_submit() {
            "[Add Todo]"
        } else {
            "[Add Todo] (disabled)"
        };
        format!(
            "Add New Todo\n  Title:       {}\n  Description: {}\n  {}",
            placeholder(&self.title, "Todo title..."),
            placeholder(&self.description, "Description (optional)..."),
            button
        )
    }
}

fn placeholder<'a>(value: &'a str, hint: &'a str) -> &'a str {
    if value.is_empty() {
        hint
    } else {
        value
    }
}
