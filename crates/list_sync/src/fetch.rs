//! Result-set ownership and merge semantics for list fetches.

use shared::protocol::{ListPayload, ListResponse, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    #[default]
    Replace,
    Append,
}

/// One issued fetch. Only the most recently issued ticket may land.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    mode: FetchMode,
    payload: ListPayload,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn payload(&self) -> &ListPayload {
        &self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was merged. `stale_page` is set when the backend reports
    /// rows but the merged result is empty.
    Applied { stale_page: bool },
    /// A newer fetch was issued after this one; nothing was touched.
    Superseded,
}

#[derive(Debug, Default)]
pub struct FetchOrchestrator {
    mode: FetchMode,
    generation: u64,
    items: Vec<Record>,
    total_rows: u64,
}

impl FetchOrchestrator {
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Makes the next fetch append to the current items.
    pub fn set_append(&mut self) {
        self.mode = FetchMode::Append;
    }

    /// Drops a pending append so the next fetch replaces the items.
    pub fn set_replace(&mut self) {
        self.mode = FetchMode::Replace;
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn begin(&mut self, payload: ListPayload) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            mode: self.mode,
            payload,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn complete(&mut self, ticket: FetchTicket, response: ListResponse) -> Completion {
        if !self.is_current(&ticket) {
            return Completion::Superseded;
        }

        self.total_rows = response.total;
        match ticket.mode {
            FetchMode::Replace => self.items = response.data,
            FetchMode::Append => self.items.extend(response.data),
        }
        let stale_page = self.total_rows > 0 && self.items.is_empty();
        self.mode = FetchMode::Replace;

        Completion::Applied { stale_page }
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
