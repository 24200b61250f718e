//! Line-oriented command loop driving the `Page`.
//!
//! The loop reacts to three sources: a line of input, a bump of the cache
//! generation (something invalidated the lists), and a new health state
//! from the monitor. Commands run to completion before the next line is
//! read, so mutations issued from one shell are serialized.

use std::str::FromStr;

use todo_core::HealthStatus;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::debug;

use crate::cache::QueryScope;
use crate::page::Page;
use crate::queries::QueryState;
use crate::views::{DialogAction, Filter, ItemMode, ItemOutcome, SubmitOutcome, TodoList};

pub const HELP: &str = "\
Commands:
  title <text>        set the title (of the new todo, or of the row being edited)
  desc <text>         set the description the same way
  add                 create a todo from the form
  filter <f>          show all | active | completed
  toggle <n>          mark row n completed
  edit <n>            edit row n
  save [n]            save the row being edited
  cancel [n]          drop an edit or a pending delete
  delete <n>          ask to delete row n
  confirm [n]         confirm the pending delete
  refresh             reload the list
  help                show this help
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Title(String),
    Description(String),
    Add,
    Filter(Filter),
    Toggle(usize),
    Edit(usize),
    Save(Option<usize>),
    Cancel(Option<usize>),
    Delete(usize),
    Confirm(Option<usize>),
    Refresh,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "title" => Ok(Command::Title(rest.to_string())),
            "desc" | "description" => Ok(Command::Description(rest.to_string())),
            "add" => Ok(Command::Add),
            "filter" => rest.parse().map(Command::Filter),
            "toggle" | "done" => row(rest).map(Command::Toggle),
            "edit" => row(rest).map(Command::Edit),
            "save" => optional_row(rest).map(Command::Save),
            "cancel" => optional_row(rest).map(Command::Cancel),
            "delete" | "rm" => row(rest).map(Command::Delete),
            "confirm" => optional_row(rest).map(Command::Confirm),
            "refresh" => Ok(Command::Refresh),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

fn row(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a row number, got '{arg}'")),
    }
}

fn optional_row(arg: &str) -> Result<Option<usize>, String> {
    if arg.is_empty() {
        Ok(None)
    } else {
        row(arg).map(Some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one command against the page, re-syncing the list after any
/// successful write.
pub async fn apply(page: &mut Page, command: Command) -> Flow {
    let queries = page.queries().clone();
    page.clear_status();

    match command {
        Command::Title(text) => match find_row(&page.list, is_editing) {
            Some(n) => set_draft(page, n, |item| item.set_draft_title(&text)),
            None => page.form.set_title(&text),
        },
        Command::Description(text) => match find_row(&page.list, is_editing) {
            Some(n) => set_draft(page, n, |item| item.set_draft_description(&text)),
            None => page.form.set_description(&text),
        },
        Command::Add => match page.form.submit(&queries).await {
            SubmitOutcome::Created(_) => {
                page.set_status("Todo added.");
                page.sync().await;
            }
            SubmitOutcome::Invalid(e) => page.set_status(e.to_string()),
            SubmitOutcome::Busy => page.set_status("A todo is already being added."),
            SubmitOutcome::Failed(message) => page.set_status(format!("Could not add todo: {message}")),
        },
        Command::Filter(filter) => page.list.set_filter(filter, &queries).await,
        Command::Toggle(n) => {
            let outcome = match page.list.item_mut(n) {
                Some(item) => item.toggle_complete(&queries).await,
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Edit(n) => {
            let outcome = match page.list.item_mut(n) {
                Some(item) => item.start_edit(),
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Save(n) => {
            let Some(n) = n.or_else(|| find_row(&page.list, is_editing)) else {
                page.set_status("Nothing is being edited.");
                return Flow::Continue;
            };
            let outcome = match page.list.item_mut(n) {
                Some(item) => item.save(&queries).await,
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Cancel(n) => {
            let Some(n) = n.or_else(|| find_row(&page.list, |mode| *mode != ItemMode::Normal)) else {
                page.set_status("Nothing to cancel.");
                return Flow::Continue;
            };
            let outcome = match page.list.item_mut(n) {
                Some(item) if *item.mode() == ItemMode::ConfirmingDelete => {
                    item.resolve_dialog(DialogAction::Cancel, &queries).await
                }
                Some(item) => item.cancel_edit(),
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Delete(n) => {
            let outcome = match page.list.item_mut(n) {
                Some(item) => item.request_delete(),
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Confirm(n) => {
            let Some(n) = n.or_else(|| find_row(&page.list, |mode| *mode == ItemMode::ConfirmingDelete)) else {
                page.set_status("No delete is waiting for confirmation.");
                return Flow::Continue;
            };
            let outcome = match page.list.item_mut(n) {
                Some(item) => item.resolve_dialog(DialogAction::Confirm, &queries).await,
                None => return missing_row(page, n),
            };
            report(page, outcome).await;
        }
        Command::Refresh => {
            queries.cache().invalidate(&QueryScope::TodoLists);
            page.sync().await;
        }
        Command::Help => page.set_status(HELP),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn is_editing(mode: &ItemMode) -> bool {
    matches!(mode, ItemMode::Editing(_))
}

/// 1-based index of the first row whose mode satisfies `pred`.
fn find_row(list: &TodoList, pred: impl Fn(&ItemMode) -> bool) -> Option<usize> {
    list.items().iter().position(|item| pred(item.mode())).map(|i| i + 1)
}

fn set_draft(page: &mut Page, n: usize, set: impl FnOnce(&mut crate::views::TodoItem) -> bool) {
    if let Some(item) = page.list.item_mut(n) {
        set(item);
    }
}

fn missing_row(page: &mut Page, n: usize) -> Flow {
    page.set_status(format!("There is no row {n}."));
    Flow::Continue
}

async fn report(page: &mut Page, outcome: ItemOutcome) {
    match outcome {
        ItemOutcome::Changed => {}
        ItemOutcome::Updated => {
            page.set_status("Todo updated.");
            page.sync().await;
        }
        ItemOutcome::Deleted => {
            page.set_status("Todo deleted.");
            page.sync().await;
        }
        ItemOutcome::Ignored(reason) => page.set_status(reason),
        ItemOutcome::Invalid(e) => page.set_status(e.to_string()),
        ItemOutcome::Failed(message) => page.set_status(format!("Request failed: {message}")),
    }
}

pub struct Shell {
    page: Page,
    health: watch::Receiver<QueryState<HealthStatus>>,
    generation: watch::Receiver<u64>,
}

impl Shell {
    pub fn new(page: Page, health: watch::Receiver<QueryState<HealthStatus>>) -> Self {
        let generation = page.queries().cache().subscribe();
        Self {
            page,
            health,
            generation,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Drive the page until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut health_open = true;
        let mut cache_open = true;

        let initial = self.health.borrow_and_update().clone();
        self.page.set_health(&initial);
        self.page.sync().await;
        self.generation.borrow_and_update();
        self.draw(&mut output).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => {
                            debug!(?command, "shell command");
                            if apply(&mut self.page, command).await == Flow::Quit {
                                break;
                            }
                        }
                        Err(message) => self.page.set_status(message),
                    }
                    // The command already re-synced after its own writes.
                    self.generation.borrow_and_update();
                }
                changed = self.generation.changed(), if cache_open => {
                    if changed.is_err() {
                        cache_open = false;
                        continue;
                    }
                    self.generation.borrow_and_update();
                    self.page.sync().await;
                }
                changed = self.health.changed(), if health_open => {
                    if changed.is_err() {
                        health_open = false;
                        continue;
                    }
                    let state = self.health.borrow_and_update().clone();
                    self.page.set_health(&state);
                }
            }
            self.draw(&mut output).await?;
        }
        output.flush().await
    }

    async fn draw<W: AsyncWrite + Unpin>(&self, output: &mut W) -> std::io::Result<()> {
        output.write_all(b"\n").await?;
        output.write_all(self.page.render().as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await
    }
}
