//! In-memory result store keyed by RunId.
//!
//! Holds finished runs for the lifetime of a process and remembers which one
//! was stored last. The store is an ordinary value: callers own it and pass it
//! by reference.

use std::collections::BTreeMap;

use crate::config::RunId;
use crate::runner::RunResult;

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: BTreeMap<RunId, RunResult>,
    latest: Option<RunId>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result and mark it latest. Returns the result it replaced,
    /// if a run with the same RunId was already stored.
    pub fn put(&mut self, result: RunResult) -> Option<RunResult> {
        let run_id = result.run_id.clone();
        self.latest = Some(run_id.clone());
        self.results.insert(run_id, result)
    }

    pub fn get(&self, run_id: &str) -> Option<&RunResult> {
        self.results.get(run_id)
    }

    pub fn contains(&self, run_id: &str) -> bool {
        self.results.contains_key(run_id)
    }

    /// The most recently stored result.
    pub fn latest(&self) -> Option<&RunResult> {
        self.latest.as_deref().and_then(|id| self.results.get(id))
    }

    /// Remove a result. Removing the latest one leaves no latest.
    pub fn remove(&mut self, run_id: &str) -> Option<RunResult> {
        if self.latest.as_deref() == Some(run_id) {
            self.latest = None;
        }
        self.results.remove(run_id)
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.latest = None;
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// All stored results in RunId order.
    pub fn iter(&self) -> impl Iterator<Item = &RunResult> {
        self.results.values()
    }
}
