//! The scheduler contract shared by EDF, HEFT and HEFT*.
//!
//! A schedule call is a pure function of `(dag, resources)`, so the trait
//! has a single method and no `&mut self` — there is nothing for a static
//! list scheduler to remember between calls.

use crate::dag::Dag;
use crate::error::Result;
use crate::resource::Resources;
use crate::schedule::ScheduleResult;

/// Implemented by each of the three list-scheduling algorithms.
pub trait Scheduler {
    /// Computes a full placement for every task in `dag` onto `resources`.
    ///
    /// Returns `Err` only for the fatal error classes (`InvalidConfig`,
    /// `MalformedGraph`, `MissingPredecessor`); a GANG task that cannot be
    /// placed is recorded in the result's `unscheduled` set instead of
    /// aborting the call.
    fn schedule(&self, dag: &Dag, resources: &Resources) -> Result<ScheduleResult>;
}
