//! A single todo row with inline edit and confirmed delete.
//!
//! Completion is one-way: a completed todo cannot be reopened from its row
//! and can no longer be edited. Deleting goes through a `ConfirmDialog`.

use todo_core::{Todo, TodoRequest, ValidationError};
use tracing::error;

use crate::queries::{MutationState, TodoQueries};
use crate::views::dialog::{ConfirmDialog, DialogAction, DialogVariant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Normal,
    Editing(EditDraft),
    ConfirmingDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Local state changed; nothing was sent.
    Changed,
    Updated,
    Deleted,
    /// Nothing was sent; the action is not available in the current state.
    Ignored(&'static str),
    Invalid(ValidationError),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TodoItem {
    todo: Todo,
    mode: ItemMode,
    update: MutationState,
    delete: MutationState,
    dialog: ConfirmDialog,
}

impl TodoItem {
    pub fn new(todo: Todo) -> Self {
        Self {
            todo,
            mode: ItemMode::Normal,
            update: MutationState::Idle,
            delete: MutationState::Idle,
            dialog: ConfirmDialog::new(
                "Delete Todo",
                "Are you sure you want to delete this todo? This action cannot be undone.",
            )
            .confirm_text("Delete")
            .variant(DialogVariant::Danger),
        }
    }

    pub fn todo(&self) -> &Todo {
        &self.todo
    }

    pub fn mode(&self) -> &ItemMode {
        &self.mode
    }

    /// Swap in a freshly fetched copy of the same todo, keeping local mode.
    pub fn replace_todo(&mut self, todo: Todo) {
        self.todo = todo;
        if self.todo.completed && matches!(self.mode, ItemMode::Editing(_)) {
            self.mode = ItemMode::Normal;
        }
    }

    pub fn can_edit(&self) -> bool {
        !self.todo.completed
    }

    pub fn dialog(&self) -> ConfirmDialog {
        self.dialog.with_open(self.mode == ItemMode::ConfirmingDelete)
    }

    pub async fn toggle_complete(&mut self, queries: &TodoQueries) -> ItemOutcome {
        if self.todo.completed {
            return ItemOutcome::Ignored("completed todos cannot be reopened");
        }
        if self.update.is_pending() {
            return ItemOutcome::Ignored("an update is already in flight");
        }
        let request = TodoRequest {
            title: self.todo.title.clone(),
            description: self.todo.description.clone(),
            completed: Some(true),
        };
        self.run_update(queries, &request).await
    }

    pub fn start_edit(&mut self) -> ItemOutcome {
        if !self.can_edit() {
            return ItemOutcome::Ignored("completed todos cannot be edited");
        }
        if self.mode != ItemMode::Normal {
            return ItemOutcome::Ignored("finish the current action first");
        }
        self.mode = ItemMode::Editing(EditDraft {
            title: self.todo.title.clone(),
            description: self.todo.description.clone().unwrap_or_default(),
        });
        ItemOutcome::Changed
    }

    pub fn set_draft_title(&mut self, title: &str) -> bool {
        match &mut self.mode {
            ItemMode::Editing(draft) => {
                draft.title = title.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_draft_description(&mut self, description: &str) -> bool {
        match &mut self.mode {
            ItemMode::Editing(draft) => {
                draft.description = description.to_string();
                true
            }
            _ => false,
        }
    }

    /// Validate the draft and send it, keeping the current completed flag.
    /// Leaves editing only once the server accepted the change.
    pub async fn save(&mut self, queries: &TodoQueries) -> ItemOutcome {
        let ItemMode::Editing(draft) = &self.mode else {
            return ItemOutcome::Ignored("not editing");
        };
        if self.update.is_pending() {
            return ItemOutcome::Ignored("an update is already in flight");
        }
        let request = match TodoRequest::validated(&draft.title, &draft.description, Some(self.todo.completed)) {
            Ok(request) => request,
            Err(e) => return ItemOutcome::Invalid(e),
        };
        let outcome = self.run_update(queries, &request).await;
        if outcome == ItemOutcome::Updated {
            self.mode = ItemMode::Normal;
        }
        outcome
    }

    /// Drop the draft without any request.
    pub fn cancel_edit(&mut self) -> ItemOutcome {
        if !matches!(self.mode, ItemMode::Editing(_)) {
            return ItemOutcome::Ignored("not editing");
        }
        self.mode = ItemMode::Normal;
        ItemOutcome::Changed
    }

    pub fn request_delete(&mut self) -> ItemOutcome {
        if self.mode != ItemMode::Normal {
            return ItemOutcome::Ignored("finish the current action first");
        }
        self.mode = ItemMode::ConfirmingDelete;
        ItemOutcome::Changed
    }

    pub fn cancel_delete(&mut self) -> ItemOutcome {
        if self.mode != ItemMode::ConfirmingDelete {
            return ItemOutcome::Ignored("no delete to cancel");
        }
        self.mode = ItemMode::Normal;
        ItemOutcome::Changed
    }

    /// Delete, then dismiss the dialog once the request has completed.
    pub async fn confirm_delete(&mut self, queries: &TodoQueries) -> ItemOutcome {
        if self.mode != ItemMode::ConfirmingDelete {
            return ItemOutcome::Ignored("delete was not requested");
        }
        if self.delete.is_pending() {
            return ItemOutcome::Ignored("a delete is already in flight");
        }
        self.delete = MutationState::Pending;
        let result = queries.delete(&self.todo.id).await;
        self.delete = MutationState::from_result(&result);
        self.mode = ItemMode::Normal;
        match result {
            Ok(_) => ItemOutcome::Deleted,
            Err(e) => {
                error!(id = %self.todo.id, error = %e, "failed to delete todo");
                ItemOutcome::Failed(e.to_string())
            }
        }
    }

    /// Route the dialog's answer to confirm or cancel.
    pub async fn resolve_dialog(&mut self, action: DialogAction, queries: &TodoQueries) -> ItemOutcome {
        match action {
            DialogAction::Confirm => self.confirm_delete(queries).await,
            DialogAction::Cancel => self.cancel_delete(),
        }
    }

    async fn run_update(&mut self, queries: &TodoQueries, request: &TodoRequest) -> ItemOutcome {
        self.update = MutationState::Pending;
        let result = queries.update(&self.todo.id, request).await;
        self.update = MutationState::from_result(&result);
        match result {
            Ok(_) => ItemOutcome::Updated,
            Err(e) => {
                error!(id = %self.todo.id, error = %e, "failed to update todo");
                ItemOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn render(&self, index: usize) -> String {
        let mut out = String::new();
        match &self.mode {
            ItemMode::Editing(draft) => {
                out.push_str(&format!("{index:>3}. [ ] editing\n"));
                out.push_str(&format!("       title: {}\n", draft.title));
                out.push_str(&format!("       description: {}\n", draft.description));
                out.push_str("       (save / cancel)");
            }
            _ => {
                let mark = if self.todo.completed { "[✓]" } else { "[ ]" };
                let title = if self.todo.completed {
                    strike(&self.todo.title)
                } else {
                    self.todo.title.clone()
                };
                out.push_str(&format!("{index:>3}. {mark} {title}"));
                if let Some(description) = &self.todo.description {
                    out.push_str(&format!("\n       {description}"));
                }
                out.push_str(&format!(
                    "\n       Created: {}",
                    self.todo.created_at.format("%Y-%m-%d")
                ));
                if let Some(dialog) = self.dialog().render() {
                    out.push('\n');
                    out.push_str(&dialog);
                }
            }
        }
        out
    }
}

fn strike(text: &str) -> String {
    text.chars().flat_map(|c| [c, '\u{0336}']).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use todo_core::HttpMethod;

    use super::*;
    use crate::testing::{envelope, queries, todo_json, ScriptedTransport};

    fn todo(id: &str, title: &str, completed: bool) -> Todo {
        let mut value = todo_json(id, title, completed);
        value["description"] = json!("original description");
        serde_json::from_value(value).unwrap()
    }

    fn body(request: &todo_core::HttpRequest) -> serde_json::Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn toggle_completes_and_keeps_other_fields() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(todo_json("1", "Buy milk", true)));
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        assert_eq!(item.toggle_complete(&queries).await, ItemOutcome::Updated);

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].path, "http://test/api/todos/1");
        assert_eq!(
            body(&requests[0]),
            json!({ "title": "Buy milk", "description": "original description", "completed": true })
        );
    }

    #[tokio::test]
    async fn completed_item_cannot_be_reopened_or_edited() {
        let transport = ScriptedTransport::new();
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", true));

        assert!(matches!(item.toggle_complete(&queries).await, ItemOutcome::Ignored(_)));
        assert!(!item.can_edit());
        assert!(matches!(item.start_edit(), ItemOutcome::Ignored(_)));
        assert_eq!(item.mode(), &ItemMode::Normal);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn save_sends_trimmed_draft_and_leaves_editing() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(todo_json("1", "Buy oat milk", false)));
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        item.start_edit();
        assert_eq!(
            item.mode(),
            &ItemMode::Editing(EditDraft {
                title: "Buy milk".to_string(),
                description: "original description".to_string(),
            })
        );
        item.set_draft_title("  Buy oat milk ");
        item.set_draft_description("  ");

        assert_eq!(item.save(&queries).await, ItemOutcome::Updated);
        assert_eq!(item.mode(), &ItemMode::Normal);
        assert_eq!(
            body(&transport.requests()[0]),
            json!({ "title": "Buy oat milk", "completed": false })
        );
    }

    #[tokio::test]
    async fn save_with_blank_title_is_rejected_locally() {
        let transport = ScriptedTransport::new();
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        item.start_edit();
        item.set_draft_title("   ");

        assert_eq!(item.save(&queries).await, ItemOutcome::Invalid(ValidationError::EmptyTitle));
        assert!(matches!(item.mode(), ItemMode::Editing(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_save_stays_in_editing() {
        let transport = ScriptedTransport::new();
        transport.fail("refused");
        let queries = queries(transport);
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        item.start_edit();
        item.set_draft_title("Changed");

        assert!(matches!(item.save(&queries).await, ItemOutcome::Failed(_)));
        assert!(matches!(item.mode(), ItemMode::Editing(ref d) if d.title == "Changed"));
    }

    #[test]
    fn cancel_edit_restores_display_without_request() {
        let mut item = TodoItem::new(todo("1", "Buy milk", false));
        item.start_edit();
        item.set_draft_title("Something else");

        assert_eq!(item.cancel_edit(), ItemOutcome::Changed);
        assert_eq!(item.mode(), &ItemMode::Normal);
        assert_eq!(item.todo().title, "Buy milk");
        assert!(item.render(1).contains("Buy milk"));

        item.start_edit();
        assert!(matches!(item.mode(), ItemMode::Editing(ref d) if d.title == "Buy milk"));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let transport = ScriptedTransport::new();
        transport.respond(200, json!({ "message": "Todo deleted successfully" }));
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        assert!(matches!(item.confirm_delete(&queries).await, ItemOutcome::Ignored(_)));
        assert!(transport.requests().is_empty());

        item.request_delete();
        assert!(item.dialog().is_open);
        assert!(item.render(1).contains("Delete Todo"));

        assert_eq!(item.confirm_delete(&queries).await, ItemOutcome::Deleted);
        assert!(!item.dialog().is_open);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn cancel_delete_closes_dialog_without_request() {
        let transport = ScriptedTransport::new();
        let queries = queries(transport.clone());
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        item.request_delete();
        assert_eq!(item.resolve_dialog(DialogAction::Cancel, &queries).await, ItemOutcome::Changed);
        assert!(!item.dialog().is_open);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_dismisses_dialog_and_keeps_item() {
        let transport = ScriptedTransport::new();
        transport.respond(500, json!({ "error": "boom" }));
        let queries = queries(transport);
        let mut item = TodoItem::new(todo("1", "Buy milk", false));

        item.request_delete();
        assert!(matches!(item.confirm_delete(&queries).await, ItemOutcome::Failed(_)));
        assert_eq!(item.mode(), &ItemMode::Normal);
        assert_eq!(item.todo().id, "1");
    }

    #[test]
    fn completed_row_shows_static_check() {
        let item = TodoItem::new(todo("1", "Done", true));
        assert!(item.render(1).contains("[✓]"));
    }
}
