//! Schedule and schedule-entry types produced by a [`crate::scheduler::Scheduler`].
//!
//! Each resource holds a plain `Vec` of entries rather than a sorted set,
//! since a scheduler commits entries to a resource in non-decreasing
//! start-time order already.

use std::collections::BTreeSet;

/// A single `(task, start, end)` commitment on one resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub task: usize,
    pub start: f64,
    pub end: f64,
}

impl ScheduleEntry {
    pub fn new(task: usize, start: f64, end: f64) -> Self {
        Self { task, start, end }
    }
}

/// A completed placement: for each resource, the ordered, non-overlapping
/// sequence of entries committed to it. GANG entries appear identically on
/// every resource in their reservation.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<Vec<ScheduleEntry>>,
}

impl Schedule {
    pub fn new(num_resources: usize) -> Self {
        Self {
            entries: vec![Vec::new(); num_resources],
        }
    }

    pub fn push(&mut self, resource: usize, entry: ScheduleEntry) {
        self.entries[resource].push(entry);
    }

    pub fn on_resource(&self, resource: usize) -> &[ScheduleEntry] {
        &self.entries[resource]
    }

    pub fn num_resources(&self) -> usize {
        self.entries.len()
    }

    pub fn all_entries(&self) -> impl Iterator<Item = (usize, &ScheduleEntry)> {
        self.entries
            .iter()
            .enumerate()
            .flat_map(|(r, es)| es.iter().map(move |e| (r, e)))
    }
}

/// The full output of a scheduling call: the placement, its makespan and
/// per-resource utilization, and (for HEFT*) the set of tasks that could
/// not be placed.
#[derive(Debug, Clone)]
pub struct ScheduleResult {
    pub schedule: Schedule,
    pub makespan: f64,
    pub utilization: Vec<f64>,
    pub avg_utilization: f64,
    /// Tasks for which no GANG window could be found (HEFT* only; always
    /// empty for EDF and HEFT).
    pub unscheduled: BTreeSet<usize>,
    /// Fraction of scheduled tasks with `num_cores > 1` (HEFT* only).
    pub gang_percentage: Option<f64>,
}
