//! Filterable todo list.
//!
//! The filter picks which server query runs (`All` fetches everything,
//! `Active`/`Completed` fetch by completion flag). The loaded set is then
//! filtered again client-side for display, and the tab counts are computed
//! from that loaded set, so they always add up.

use std::fmt;
use std::str::FromStr;

use todo_core::Todo;

use crate::queries::{QueryState, TodoQueries};
use crate::views::item::TodoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// The `completed` query parameter this filter maps to.
    pub fn query_param(self) -> Option<bool> {
        match self {
            Filter::All => None,
            Filter::Active => Some(false),
            Filter::Completed => Some(true),
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Filter::All => "No todos yet. Add one above!",
            Filter::Active => "No active todos.",
            Filter::Completed => "No completed todos.",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl FilterCounts {
    pub fn of(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            all: todos.len(),
            active: todos.len() - completed,
            completed,
        }
    }

    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Active => self.active,
            Filter::Completed => self.completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TodoList {
    filter: Filter,
    state: QueryState<Vec<Todo>>,
    items: Vec<TodoItem>,
}

impl Default for TodoList {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            state: QueryState::Loading,
            items: Vec::new(),
        }
    }
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn state(&self) -> &QueryState<Vec<Todo>> {
        &self.state
    }

    /// Re-run the query for the current filter and rebuild the rows. Rows
    /// whose todo is still present keep their edit or confirm state.
    pub async fn refresh(&mut self, queries: &TodoQueries) {
        self.state = queries.list(self.filter.query_param()).await;
        self.rebuild_items();
    }

    pub async fn set_filter(&mut self, filter: Filter, queries: &TodoQueries) {
        if filter != self.filter {
            self.filter = filter;
            self.state = QueryState::Loading;
            self.items.clear();
        }
        self.refresh(queries).await;
    }

    pub fn counts(&self) -> FilterCounts {
        self.state
            .data()
            .map(|todos| FilterCounts::of(todos))
            .unwrap_or_default()
    }

    /// Loaded todos passing the current filter, in server order.
    pub fn visible(&self) -> Vec<&Todo> {
        self.state
            .data()
            .map(|todos| todos.iter().filter(|t| self.filter.matches(t)).collect())
            .unwrap_or_default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Row by 1-based display index.
    pub fn item_mut(&mut self, index: usize) -> Option<&mut TodoItem> {
        index.checked_sub(1).and_then(|i| self.items.get_mut(i))
    }

    fn rebuild_items(&mut self) {
        let visible: Vec<Todo> = self.visible().into_iter().cloned().collect();
        let mut previous = std::mem::take(&mut self.items);
        self.items = visible
            .into_iter()
            .map(|todo| match previous.iter().position(|item| item.todo().id == todo.id) {
                Some(pos) => {
                    let mut item = previous.swap_remove(pos);
                    item.replace_todo(todo);
                    item
                }
                None => TodoItem::new(todo),
            })
            .collect();
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Your Todos\n");
        let counts = self.counts();
        let tabs: Vec<String> = Filter::ALL
            .iter()
            .map(|&filter| {
                let tab = format!("{} ({})", filter.label(), counts.get(filter));
                if filter == self.filter {
                    format!("[{tab}]")
                } else {
                    format!(" {tab} ")
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", tabs.join(" ")));

        match &self.state {
            QueryState::Idle | QueryState::Loading => out.push_str("  Loading todos..."),
            QueryState::Error(_) => out.push_str("  Failed to load todos. Please try again."),
            QueryState::Success(_) if self.items.is_empty() => {
                out.push_str("  ");
                out.push_str(self.filter.empty_message());
            }
            QueryState::Success(_) => {
                let rows: Vec<String> = self
                    .items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.render(i + 1))
                    .collect();
                out.push_str(&rows.join("\n"));
            }
        }
        out
    }
}
