use crate::model::{ResultRow, SearchState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Settled,
    Cleared,
}

/// Identifies one issued search. Only the ticket matching the machine's
/// current generation may write rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// UI-facing search state. Rows survive a `Loading` phase untouched so the
/// previous answer stays available until the new one lands.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    rows: Vec<ResultRow>,
    loading: bool,
    resting: Phase,
    generation: u64,
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loading: false,
            resting: Phase::Idle,
            generation: 0,
        }
    }
}

impl SelectionMachine {
    pub fn issue(&mut self) -> Ticket {
        self.generation += 1;
        Ticket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.loading = false;
        self.resting = Phase::Cleared;
    }

    /// Returns `false` and leaves the state alone when `ticket` was superseded.
    pub fn settle(&mut self, ticket: Ticket, rows: Vec<ResultRow>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.force_settle(rows);
        true
    }

    pub fn force_settle(&mut self, rows: Vec<ResultRow>) {
        self.rows = rows;
        self.loading = false;
        self.resting = Phase::Settled;
    }

    /// Drops the loading flag for a search that ended without settling.
    pub fn release(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) || !self.loading {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else {
            self.resting
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn state(&self) -> SearchState {
        SearchState {
            loading: self.loading,
            rows: self.rows.clone(),
        }
    }
}
