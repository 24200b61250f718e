//! Generic confirmation modal.
//!
//! The dialog holds no lifecycle of its own: whoever owns it sets `is_open`
//! and reacts to the chosen `DialogAction`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogVariant {
    #[default]
    Default,
    /// Destructive action; the confirm button is rendered as a warning.
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub is_open: bool,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub variant: DialogVariant,
}

impl ConfirmDialog {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            is_open: false,
            title: title.to_string(),
            message: message.to_string(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            variant: DialogVariant::Default,
        }
    }

    pub fn confirm_text(mut self, text: &str) -> Self {
        self.confirm_text = text.to_string();
        self
    }

    pub fn cancel_text(mut self, text: &str) -> Self {
        self.cancel_text = text.to_string();
        self
    }

    pub fn variant(mut self, variant: DialogVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Copy of this dialog with the open flag supplied by the caller.
    pub fn with_open(&self, is_open: bool) -> Self {
        Self {
            is_open,
            ..self.clone()
        }
    }

    /// `None` while closed.
    pub fn render(&self) -> Option<String> {
        if !self.is_open {
            return None;
        }
        let confirm = match self.variant {
            DialogVariant::Danger => format!("<!{}!>", self.confirm_text),
            DialogVariant::Default => format!("<{}>", self.confirm_text),
        };
        Some(format!(
            "  +-- {} --\n  | {}\n  | [{}]  {}\n  +--",
            self.title, self.message, self.cancel_text, confirm
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_dialog_renders_nothing() {
        assert!(ConfirmDialog::new("Delete", "Sure?").render().is_none());
    }

    #[test]
    fn defaults_labels() {
        let dialog = ConfirmDialog::new("Delete", "Sure?");
        assert_eq!(dialog.confirm_text, "Confirm");
        assert_eq!(dialog.cancel_text, "Cancel");
        assert_eq!(dialog.variant, DialogVariant::Default);
    }

    #[test]
    fn open_danger_dialog_shows_custom_labels() {
        let dialog = ConfirmDialog::new("Delete Todo", "This cannot be undone.")
            .confirm_text("Delete")
            .cancel_text("Keep")
            .variant(DialogVariant::Danger)
            .with_open(true);
        let text = dialog.render().unwrap();
        assert!(text.contains("Delete Todo"));
        assert!(text.contains("This cannot be undone."));
        assert!(text.contains("[Keep]"));
        assert!(text.contains("<!Delete!>"));
    }
}
