use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::lookup::{Lookup, LookupError};
use crate::model::{rows_from_matches, ResultRow};
use crate::selection::{SelectionMachine, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Empty query; rows emptied without calling the lookup.
    Cleared,
    /// A newer search was issued before this one resolved; nothing written.
    Stale,
    /// Lookup returned no matches; the no-result row was written.
    Empty,
    /// Matches were written as rows `1..=count`.
    Results { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Cleared,
    Issued(Ticket),
}

/// A lookup failure, returned after the error row has been handled so callers
/// can still report it upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub query: String,
    pub error: LookupError,
    /// Whether the error row reached the shared state.
    pub applied: bool,
}

impl Display for SearchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "lookup failed for '{}': {}", self.query, self.error)
    }
}

impl std::error::Error for SearchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct QueryExecutor {
    lookup: Arc<dyn Lookup>,
    state: watch::Sender<SelectionMachine>,
    show_stale_errors: bool,
}

impl QueryExecutor {
    pub fn new(lookup: Arc<dyn Lookup>) -> Self {
        let (state, _) = watch::channel(SelectionMachine::default());
        Self {
            lookup,
            state,
            show_stale_errors: false,
        }
    }

    /// Let failures of superseded searches overwrite the current rows.
    pub fn with_stale_errors(mut self, show_stale_errors: bool) -> Self {
        self.show_stale_errors = show_stale_errors;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionMachine> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SelectionMachine {
        self.state.borrow().clone()
    }

    /// Issues the search synchronously, then resolves it. The ticket is taken
    /// when this is called, not when the returned future is first polled.
    pub fn execute<'a>(
        &'a self,
        query: &str,
    ) -> impl Future<Output = Result<Outcome, SearchFailure>> + Send + 'a {
        let submission = self.begin(query);
        let query = query.to_string();
        async move { self.run(submission, &query).await }
    }

    /// Makes `query` the current search. An empty query clears the rows
    /// right away; anything else turns loading on.
    pub fn begin(&self, query: &str) -> Submission {
        if query.is_empty() {
            self.transition(|machine| {
                machine.issue();
                machine.clear();
            });
            debug!("search cleared");
            return Submission::Cleared;
        }

        let ticket = self.transition(|machine| {
            let ticket = machine.issue();
            machine.begin_loading();
            ticket
        });
        debug!(query, generation = ticket.generation(), "search issued");
        Submission::Issued(ticket)
    }

    pub async fn run(
        &self,
        submission: Submission,
        query: &str,
    ) -> Result<Outcome, SearchFailure> {
        let ticket = match submission {
            Submission::Cleared => return Ok(Outcome::Cleared),
            Submission::Issued(ticket) => ticket,
        };

        let mut guard = LoadingGuard {
            state: &self.state,
            ticket,
            armed: true,
        };
        let result = self.lookup.lookup(query).await;

        let outcome = match result {
            Ok(matches) => {
                let count = matches.len();
                let rows = rows_from_matches(matches);
                if !self.transition(|machine| machine.settle(ticket, rows)) {
                    debug!(query, generation = ticket.generation(), "discarding stale results");
                    Ok(Outcome::Stale)
                } else if count == 0 {
                    Ok(Outcome::Empty)
                } else {
                    Ok(Outcome::Results { count })
                }
            }
            Err(error) => {
                let rows = vec![ResultRow::error(error.to_string())];
                let show_stale_errors = self.show_stale_errors;
                let applied = self.transition(|machine| {
                    if show_stale_errors {
                        machine.force_settle(rows);
                        true
                    } else {
                        machine.settle(ticket, rows)
                    }
                });
                debug!(query, applied, %error, "search failed");
                Err(SearchFailure {
                    query: query.to_string(),
                    error,
                    applied,
                })
            }
        };

        guard.armed = false;
        outcome
    }

    fn transition<R: Default>(&self, apply: impl FnOnce(&mut SelectionMachine) -> R) -> R {
        let mut out = R::default();
        self.state.send_modify(|machine| out = apply(machine));
        out
    }
}

/// Resets the loading flag if the lookup panics or the execution future is
/// dropped before it settles.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SelectionMachine>,
    ticket: Ticket,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        self.state.send_if_modified(|machine| machine.release(ticket));
    }
}
