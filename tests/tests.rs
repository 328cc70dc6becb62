//! Integration suite: concrete placement scenarios and the invariants a
//! complete scheduling core must satisfy, the latter checked over
//! `Pcg64`-seeded random DAGs.

use std::collections::BTreeSet;

use rand::prelude::*;
use rand_pcg::Pcg64;

use dag_sched_bench::{Dag, EdfScheduler, HeftScheduler, HeftStarScheduler, Resource, Resources, ScheduleResult, Scheduler};

const EPSILON: f64 = 1e-9;

fn assert_float_eq(x: f64, y: f64) {
    assert!((x - y).abs() < EPSILON, "values do not match: {x:.9} vs {y:.9}");
}

fn resources(speeds: &[f64]) -> Resources {
    Resources::new(speeds.iter().map(|&s| Resource::new(s)).collect()).unwrap()
}

// ---------------------------------------------------------------------
// Chain of three tasks
// ---------------------------------------------------------------------

#[test]
fn chain_of_three_on_fastest_resource() {
    let mut dag = Dag::new();
    let t0 = dag.add_task(2.0, 1).unwrap();
    let t1 = dag.add_task(3.0, 1).unwrap();
    let t2 = dag.add_task(4.0, 1).unwrap();
    dag.add_edge(t0, t1, 1.0).unwrap();
    dag.add_edge(t1, t2, 1.0).unwrap();
    let resources = resources(&[1.0, 2.0]);

    let heft = HeftScheduler::new().schedule(&dag, &resources).unwrap();
    assert_float_eq(heft.makespan, 4.5);
    assert_eq!(heft.utilization, vec![0.0, 1.0]);
    let r1 = heft.schedule.on_resource(1);
    assert_eq!(r1.len(), 3);
    assert_eq!((r1[0].start, r1[0].end), (0.0, 1.0));
    assert_eq!((r1[1].start, r1[1].end), (1.0, 2.5));
    assert_eq!((r1[2].start, r1[2].end), (2.5, 4.5));

    let edf = EdfScheduler::new().schedule(&dag, &resources).unwrap();
    assert_float_eq(edf.makespan, 4.5);
    for (a, b) in heft.schedule.on_resource(1).iter().zip(edf.schedule.on_resource(1).iter()) {
        assert_float_eq(a.start, b.start);
        assert_float_eq(a.end, b.end);
    }
}

// ---------------------------------------------------------------------
// Diamond-shaped dependency graph
// ---------------------------------------------------------------------

#[test]
fn diamond_pays_communication_across_resources() {
    let mut dag = Dag::new();
    let t0 = dag.add_task(2.0, 1).unwrap();
    let t1 = dag.add_task(2.0, 1).unwrap();
    let t2 = dag.add_task(2.0, 1).unwrap();
    let t3 = dag.add_task(2.0, 1).unwrap();
    dag.add_edge(t0, t1, 1.0).unwrap();
    dag.add_edge(t0, t2, 1.0).unwrap();
    dag.add_edge(t1, t3, 1.0).unwrap();
    dag.add_edge(t2, t3, 1.0).unwrap();
    let resources = resources(&[1.0, 1.0]);

    let heft = HeftScheduler::new().schedule(&dag, &resources).unwrap();
    assert_float_eq(heft.makespan, 7.0);
}

// ---------------------------------------------------------------------
// Single isolated task
// ---------------------------------------------------------------------

#[test]
fn isolated_task_runs_at_time_zero_on_every_scheduler() {
    let mut dag = Dag::new();
    dag.add_task(5.0, 1).unwrap();
    let resources = resources(&[1.0]);

    for result in [
        EdfScheduler::new().schedule(&dag, &resources).unwrap(),
        HeftScheduler::new().schedule(&dag, &resources).unwrap(),
        HeftStarScheduler::new().schedule(&dag, &resources).unwrap(),
    ] {
        let entry = result.schedule.on_resource(0)[0];
        assert_float_eq(entry.start, 0.0);
        assert_float_eq(entry.end, 5.0);
        assert_float_eq(result.makespan, 5.0);
        assert_float_eq(result.utilization[0], 1.0);
    }
}

// ---------------------------------------------------------------------
// GANG task on homogeneous cores
// ---------------------------------------------------------------------

#[test]
fn gang_task_reserves_contiguous_window_on_homogeneous_cores() {
    let mut dag = Dag::new();
    let t0 = dag.add_task(4.0, 1).unwrap();
    let t1 = dag.add_task(6.0, 2).unwrap();
    dag.add_edge(t0, t1, 1.0).unwrap();
    let resources = resources(&[1.0, 1.0, 1.0]);

    let result = HeftStarScheduler::new().schedule(&dag, &resources).unwrap();
    assert!(result.unscheduled.is_empty());
    assert_float_eq(result.makespan, 10.0);

    let gang_entries: Vec<_> = result.schedule.all_entries().filter(|(_, e)| e.task == t1).collect();
    assert_eq!(gang_entries.len(), 2);
    for (_, e) in &gang_entries {
        assert_float_eq(e.start, 4.0);
        assert_float_eq(e.end, 10.0);
    }
    let occupied: BTreeSet<usize> = gang_entries.iter().map(|(r, _)| *r).collect();
    assert!(occupied.contains(&0), "window must include predecessor's resource to avoid communication cost");
}

// ---------------------------------------------------------------------
// GANG task that cannot be placed
// ---------------------------------------------------------------------

#[test]
fn gang_task_exceeding_largest_group_is_unscheduled() {
    let mut dag = Dag::new();
    dag.add_task(4.0, 4).unwrap();
    let resources = resources(&[1.0, 1.0, 1.0]);

    let result = HeftStarScheduler::new().schedule(&dag, &resources).unwrap();
    assert_eq!(result.unscheduled, BTreeSet::from([0]));
    assert_float_eq(result.makespan, 0.0);
    assert!(result.utilization.iter().all(|&u| u == 0.0));
}

// ---------------------------------------------------------------------
// Heterogeneous resource speeds
// ---------------------------------------------------------------------

#[test]
fn independent_tasks_prefer_the_faster_resource() {
    let mut dag = Dag::new();
    dag.add_task(10.0, 1).unwrap();
    dag.add_task(10.0, 1).unwrap();
    let resources = resources(&[1.0, 2.0]);

    let heft = HeftScheduler::new().schedule(&dag, &resources).unwrap();
    assert_float_eq(heft.makespan, 10.0);
    let edf = EdfScheduler::new().schedule(&dag, &resources).unwrap();
    assert_float_eq(edf.makespan, 10.0);
}

// ---------------------------------------------------------------------
// Randomized DAG / resource generation for the property-style checks.
// ---------------------------------------------------------------------

fn gen_dag(rng: &mut Pcg64, num_tasks: usize, edge_probability: f64, max_cores: u32) -> Dag {
    let mut dag = Dag::new();
    for _ in 0..num_tasks {
        let weight = rng.gen_range(1.0..100.0);
        let num_cores = rng.gen_range(1..=max_cores);
        dag.add_task(weight, num_cores).unwrap();
    }
    // Only edges from lower id to higher id, guaranteeing acyclicity.
    for u in 0..num_tasks {
        for v in (u + 1)..num_tasks {
            if rng.gen_bool(edge_probability) {
                let weight = rng.gen_range(0.0..10.0);
                dag.add_edge(u, v, weight).unwrap();
            }
        }
    }
    dag
}

fn gen_resources(rng: &mut Pcg64, num_resources: usize) -> Resources {
    let speeds: Vec<Resource> = (0..num_resources).map(|_| Resource::new(rng.gen_range(0.5..4.0))).collect();
    Resources::new(speeds).unwrap()
}

fn check_precedence(dag: &Dag, result: &ScheduleResult, communication_aware: bool) {
    let mut placement_of: Vec<Option<usize>> = vec![None; dag.num_tasks()];
    let mut end_of: Vec<Option<f64>> = vec![None; dag.num_tasks()];
    for (r, e) in result.schedule.all_entries() {
        placement_of[e.task] = Some(r);
        end_of[e.task] = Some(e.end);
    }

    for u in 0..dag.num_tasks() {
        if result.unscheduled.contains(&u) {
            continue;
        }
        for edge in dag.successors(u) {
            let v = edge.to;
            if result.unscheduled.contains(&v) {
                continue;
            }
            let Some(end_u) = end_of[u] else { continue };
            let start_v = result
                .schedule
                .all_entries()
                .find(|(_, e)| e.task == v)
                .map(|(_, e)| e.start)
                .unwrap();
            assert!(end_u <= start_v + EPSILON, "precedence violated: {u} -> {v}");

            if communication_aware && placement_of[u] != placement_of[v] {
                assert!(
                    start_v + EPSILON >= end_u + edge.weight,
                    "communication cost not respected on {u} -> {v}"
                );
            }
        }
    }
}

fn check_non_overlap(result: &ScheduleResult) {
    for r in 0..result.schedule.num_resources() {
        let entries = result.schedule.on_resource(r);
        for w in entries.windows(2) {
            assert!(w[0].end <= w[1].start + EPSILON, "entries overlap on resource {r}");
        }
    }
}

fn check_makespan_identity(result: &ScheduleResult) {
    let max_end = result.schedule.all_entries().map(|(_, e)| e.end).fold(0.0_f64, f64::max);
    assert_float_eq(result.makespan, max_end);
}

fn check_utilization_bounds(result: &ScheduleResult) {
    for &u in &result.utilization {
        assert!((0.0..=1.0 + 1e-9).contains(&u), "utilization out of bounds: {u}");
    }
}

#[test]
fn property_precedence_and_non_overlap_edf() {
    let mut rng = Pcg64::seed_from_u64(7);
    for _ in 0..30 {
        let dag = gen_dag(&mut rng, 12, 0.25, 1);
        let resources = gen_resources(&mut rng, 4);
        let result = EdfScheduler::new().schedule(&dag, &resources).unwrap();
        check_precedence(&dag, &result, false);
        check_non_overlap(&result);
        check_makespan_identity(&result);
        check_utilization_bounds(&result);
    }
}

#[test]
fn property_precedence_and_non_overlap_heft() {
    let mut rng = Pcg64::seed_from_u64(11);
    for _ in 0..30 {
        let dag = gen_dag(&mut rng, 12, 0.25, 1);
        let resources = gen_resources(&mut rng, 4);
        let result = HeftScheduler::new().schedule(&dag, &resources).unwrap();
        check_precedence(&dag, &result, true);
        check_non_overlap(&result);
        check_makespan_identity(&result);
        check_utilization_bounds(&result);
    }
}

#[test]
fn property_gang_atomicity_heft_star() {
    let mut rng = Pcg64::seed_from_u64(13);
    for _ in 0..30 {
        let dag = gen_dag(&mut rng, 14, 0.2, 3);
        let resources = gen_resources(&mut rng, 6);
        let result = HeftStarScheduler::new().schedule(&dag, &resources).unwrap();
        check_non_overlap(&result);
        check_makespan_identity(&result);
        check_utilization_bounds(&result);

        for task in 0..dag.num_tasks() {
            let task_info = dag.task(task);
            if task_info.num_cores <= 1 || result.unscheduled.contains(&task) {
                continue;
            }
            let entries: Vec<_> = result.schedule.all_entries().filter(|(_, e)| e.task == task).collect();
            assert_eq!(entries.len() as u32, task_info.num_cores, "GANG task {task} missing reserved entries");
            let (start, end) = (entries[0].1.start, entries[0].1.end);
            for (_, e) in &entries {
                assert_float_eq(e.start, start);
                assert_float_eq(e.end, end);
            }

            let mut window: Vec<usize> = entries.iter().map(|(r, _)| *r).collect();
            window.sort_unstable();
            let speed0 = resources.speed(window[0]);
            for &r in &window {
                assert_float_eq(resources.speed(r), speed0);
            }
            for w in window.windows(2) {
                assert_eq!(w[1], w[0] + 1, "GANG window not contiguous: {window:?}");
            }
        }
    }
}

#[test]
fn property_determinism() {
    let mut rng = Pcg64::seed_from_u64(17);
    for _ in 0..10 {
        let dag = gen_dag(&mut rng, 10, 0.3, 3);
        let resources = gen_resources(&mut rng, 5);

        let a = HeftStarScheduler::new().schedule(&dag, &resources).unwrap();
        let b = HeftStarScheduler::new().schedule(&dag, &resources).unwrap();
        assert_float_eq(a.makespan, b.makespan);
        assert_eq!(a.unscheduled, b.unscheduled);
        assert_eq!(a.utilization.len(), b.utilization.len());
        for (ua, ub) in a.utilization.iter().zip(b.utilization.iter()) {
            assert_float_eq(*ua, *ub);
        }
        for ((ra, ea), (rb, eb)) in a.schedule.all_entries().zip(b.schedule.all_entries()) {
            assert_eq!(ra, rb);
            assert_eq!(ea.task, eb.task);
            assert_float_eq(ea.start, eb.start);
            assert_float_eq(ea.end, eb.end);
        }
    }
}

#[test]
fn property_heft_makespan_at_least_as_good_as_edf_on_most_dags() {
    let mut rng = Pcg64::seed_from_u64(23);
    let mut wins = 0;
    let mut total = 0;
    for _ in 0..200 {
        let dag = gen_dag(&mut rng, 10, 0.3, 1);
        let resources = gen_resources(&mut rng, 4);
        let heft = HeftScheduler::new().schedule(&dag, &resources).unwrap();
        let edf = EdfScheduler::new().schedule(&dag, &resources).unwrap();
        total += 1;
        if heft.makespan <= edf.makespan + EPSILON {
            wins += 1;
        }
    }
    let ratio = wins as f64 / total as f64;
    assert!(ratio >= 0.95, "HEFT beat or matched EDF on only {ratio:.3} of the reference suite");
}
