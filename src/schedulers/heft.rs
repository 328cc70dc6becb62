//! HEFT: Heterogeneous Earliest-Finish-Time scheduling.
//!
//! Tasks are ordered by descending bottom-level. For each task, every
//! resource's earliest finish time is computed by accumulating predecessor
//! completion times (paying the edge's communication cost only when the
//! predecessor landed on a different resource), then the resource
//! minimizing EFT is chosen, ties going to the smallest resource id.

use log::debug;

use crate::dag::Dag;
use crate::error::Result;
use crate::metrics;
use crate::priority::bottom_levels;
use crate::resource::Resources;
use crate::schedule::{Schedule, ScheduleEntry, ScheduleResult};
use crate::scheduler::Scheduler;

/// Bottom-level-priority earliest-finish-time scheduler, communication-aware.
pub struct HeftScheduler;

impl HeftScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeftScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for HeftScheduler {
    fn schedule(&self, dag: &Dag, resources: &Resources) -> Result<ScheduleResult> {
        let bl = bottom_levels(dag)?;

        let mut order: Vec<usize> = (0..dag.num_tasks()).collect();
        order.sort_by(|&a, &b| bl[b].total_cmp(&bl[a]).then(a.cmp(&b)));

        let mut avail = vec![0.0_f64; resources.len()];
        let mut end = vec![0.0_f64; dag.num_tasks()];
        let mut placement = vec![usize::MAX; dag.num_tasks()];
        let mut schedule = Schedule::new(resources.len());

        for task_id in order {
            let task = dag.task(task_id);

            let mut best_resource = 0usize;
            let mut best_eft = f64::INFINITY;
            let mut best_est = 0.0_f64;
            for (r, resource) in resources.iter().enumerate() {
                let mut est = avail[r];
                for pred in dag.predecessors(task_id) {
                    let mut pred_end = end[pred.to];
                    if placement[pred.to] != r {
                        pred_end += pred.weight;
                    }
                    est = est.max(pred_end);
                }
                let eft = est + task.weight / resource.speed;
                if eft < best_eft {
                    best_eft = eft;
                    best_est = est;
                    best_resource = r;
                }
            }

            debug!("heft: task {task_id} -> resource {best_resource} [{best_est:.6}, {best_eft:.6}]");

            schedule.push(best_resource, ScheduleEntry::new(task_id, best_est, best_eft));
            avail[best_resource] = best_eft;
            end[task_id] = best_eft;
            placement[task_id] = best_resource;
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
