use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::error;

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::executor::{QueryExecutor, SearchFailure, Submission};
use crate::lookup::Lookup;
use crate::model::SearchState;
use crate::presentation::{present, Presentation};
use crate::selection::SelectionMachine;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

pub type SelectHandler = Arc<dyn Fn(&str) + Send + Sync>;

pub struct InputOptions {
    pub placeholder: Option<String>,
    pub on_select_item: SelectHandler,
}

impl InputOptions {
    pub fn new(on_select_item: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            placeholder: None,
            on_select_item: Arc::new(on_select_item),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behavior {
    pub show_stale_errors: bool,
    pub select_error_rows: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            show_stale_errors: false,
            select_error_rows: true,
        }
    }
}

impl From<&Config> for Behavior {
    fn from(value: &Config) -> Self {
        Self {
            show_stale_errors: value.show_stale_errors,
            select_error_rows: value.select_error_rows,
        }
    }
}

/// A search box bound to one lookup source for its whole lifetime.
///
/// Every edit goes through the debouncer; each debounced query runs on its own
/// task so slow lookups may overlap. Failures are logged and forwarded on the
/// channel returned by [`TypeaheadInput::take_failures`].
pub struct TypeaheadInput {
    options: InputOptions,
    behavior: Behavior,
    text: String,
    executor: Arc<QueryExecutor>,
    debouncer: Debouncer<String>,
    failures: Option<mpsc::UnboundedReceiver<SearchFailure>>,
}

impl TypeaheadInput {
    /// Must be called from within a tokio runtime.
    pub fn new(options: InputOptions, lookup: Arc<dyn Lookup>, behavior: Behavior) -> Self {
        let executor =
            Arc::new(QueryExecutor::new(lookup).with_stale_errors(behavior.show_stale_errors));
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();

        let worker_executor = Arc::clone(&executor);
        let debouncer = Debouncer::new(DEBOUNCE_WINDOW, move |query: String| {
            let submission = worker_executor.begin(&query);
            if submission == Submission::Cleared {
                return;
            }
            let executor = Arc::clone(&worker_executor);
            let failure_tx = failure_tx.clone();
            tokio::spawn(async move {
                if let Err(failure) = executor.run(submission, &query).await {
                    error!(query = %failure.query, applied = failure.applied, "{failure}");
                    let _ = failure_tx.send(failure);
                }
            });
        });

        Self {
            options,
            behavior,
            text: String::new(),
            executor,
            debouncer,
            failures: Some(failure_rx),
        }
    }

    pub fn on_input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.debouncer.call(self.text.clone());
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.options.placeholder.as_deref()
    }

    pub fn has_input(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn state(&self) -> SearchState {
        self.executor.snapshot().state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionMachine> {
        self.executor.subscribe()
    }

    pub fn view(&self) -> Presentation {
        present(&self.state(), self.has_input())
    }

    /// Clicks the row at `index` of the current view. Returns the value passed
    /// to the selection callback, if any.
    pub fn select(&self, index: usize) -> Option<String> {
        let view = self.view();
        let value = view
            .rows()
            .get(index)?
            .selection(self.behavior.select_error_rows)?
            .to_string();
        (self.options.on_select_item)(&value);
        Some(value)
    }

    pub fn take_failures(&mut self) -> Option<mpsc::UnboundedReceiver<SearchFailure>> {
        self.failures.take()
    }

    /// Cancels the pending debounce timer. In-flight lookups run to completion.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.debouncer.is_cancelled()
    }
}
