//! EDF: precedence-respecting earliest-finish scheduling.
//!
//! Edge weights are deliberately ignored: this measures a precedence-only
//! lower-bound schedule, not a communication-aware one.

use log::debug;

use crate::dag::Dag;
use crate::error::{Error, Result};
use crate::metrics;
use crate::priority::topological_order;
use crate::resource::Resources;
use crate::schedule::{Schedule, ScheduleEntry, ScheduleResult};
use crate::scheduler::Scheduler;

/// Earliest-finish scheduler over a topological (precedence-respecting)
/// priority order. Does not account for communication cost.
pub struct EdfScheduler;

impl EdfScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EdfScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for EdfScheduler {
    fn schedule(&self, dag: &Dag, resources: &Resources) -> Result<ScheduleResult> {
        let order = topological_order(dag)?;

        let mut avail = vec![0.0_f64; resources.len()];
        let mut end: Vec<Option<f64>> = vec![None; dag.num_tasks()];
        let mut schedule = Schedule::new(resources.len());

        for task_id in order {
            let task = dag.task(task_id);

            let mut earliest_start = 0.0_f64;
            for pred in dag.predecessors(task_id) {
                let pred_end = end[pred.to].ok_or(Error::MissingPredecessor {
                    task: pred.to,
                    for_task: task_id,
                })?;
                earliest_start = earliest_start.max(pred_end);
            }

            let mut best_resource = 0usize;
            let mut best_finish = f64::INFINITY;
            for (r, resource) in resources.iter().enumerate() {
                let ready = avail[r].max(earliest_start);
                let finish = ready + task.weight / resource.speed;
                if finish < best_finish {
                    best_finish = finish;
                    best_resource = r;
                }
            }

            let start = avail[best_resource].max(earliest_start);
            let finish = start + task.weight / resources.speed(best_resource);

            debug!("edf: task {task_id} -> resource {best_resource} [{start:.6}, {finish:.6}]");

            schedule.push(best_resource, ScheduleEntry::new(task_id, start, finish));
            avail[best_resource] = finish;
            end[task_id] = Some(finish);
        }

        let makespan = metrics::makespan(&schedule);
        let utilization = metrics::utilization(&schedule, makespan);
        let avg_utilization = metrics::avg_utilization(&utilization);

        Ok(ScheduleResult {
            schedule,
            makespan,
            utilization,
            avg_utilization,
            unscheduled: Default::default(),
            gang_percentage: None,
        })
    }
}
