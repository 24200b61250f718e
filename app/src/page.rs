//! The whole screen: header, creation form, filtered list, health footer.

use todo_core::HealthStatus;

use crate::queries::{QueryState, TodoQueries};
use crate::views::{HealthIndicator, TodoForm, TodoList};

pub struct Page {
    queries: TodoQueries,
    pub form: TodoForm,
    pub list: TodoList,
    health: HealthIndicator,
    status_line: Option<String>,
}

impl Page {
    pub fn new(queries: TodoQueries) -> Self {
        Self {
            queries,
            form: TodoForm::new(),
            list: TodoList::new(),
            health: HealthIndicator::default(),
            status_line: None,
        }
    }

    pub fn queries(&self) -> &TodoQueries {
        &self.queries
    }

    pub fn health(&self) -> &HealthIndicator {
        &self.health
    }

    /// Re-run the list query for the current filter and rebuild rows.
    pub async fn sync(&mut self) {
        self.list.refresh(&self.queries).await;
    }

    pub fn set_health(&mut self, state: &QueryState<HealthStatus>) {
        self.health.update(state);
    }

    /// One-line feedback shown above the footer until replaced.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_line = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_line = None;
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Todo App\nManage your tasks efficiently\n\n");
        out.push_str(&self.form.render());
        out.push_str("\n\n");
        out.push_str(&self.list.render());
        out.push_str("\n\n");
        if let Some(status) = &self.status_line {
            out.push_str(status);
            out.push('\n');
        }
        out.push_str(&self.health.render());
        out.push('\n');
        out
    }
}
