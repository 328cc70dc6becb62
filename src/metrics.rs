//! Makespan and utilization, shared by all three schedulers.

use std::collections::BTreeSet;

use crate::schedule::Schedule;
use crate::task::Task;

/// Makespan: the latest end time across all schedule entries (0 if the
/// schedule is empty).
pub fn makespan(schedule: &Schedule) -> f64 {
    schedule
        .all_entries()
        .map(|(_, e)| e.end)
        .fold(0.0_f64, f64::max)
}

/// Per-resource utilization: active time divided by makespan (0 if makespan
/// is 0). A GANG entry's duration counts once per resource it occupies,
/// since each of those resources was genuinely busy for that interval.
pub fn utilization(schedule: &Schedule, makespan: f64) -> Vec<f64> {
    (0..schedule.num_resources())
        .map(|r| {
            let active: f64 = schedule.on_resource(r).iter().map(|e| e.end - e.start).sum();
            if makespan > 0.0 {
                active / makespan
            } else {
                0.0
            }
        })
        .collect()
}

pub fn avg_utilization(utilization: &[f64]) -> f64 {
    if utilization.is_empty() {
        0.0
    } else {
        utilization.iter().sum::<f64>() / utilization.len() as f64
    }
}

/// Fraction of scheduled (i.e. not `unscheduled`) tasks with `num_cores > 1`.
pub fn gang_percentage(tasks: &[Task], unscheduled: &BTreeSet<usize>) -> f64 {
    let scheduled_count = tasks.len() - unscheduled.len();
    if scheduled_count == 0 {
        return 0.0;
    }
    let gang_count = tasks
        .iter()
        .enumerate()
        .filter(|(id, t)| !unscheduled.contains(id) && t.num_cores > 1)
        .count();
    gang_count as f64 / scheduled_count as f64
}
