//! Priority computation: topological ordering, bottom-level, and (for
//! HEFT*) betweenness centrality on the undirected projection.
//!
//! Bottom-level is filled in a table over reverse topological order rather
//! than computed by recursion, which also gives cycle detection for free:
//! Kahn's algorithm leaves nodes unresolved exactly when a cycle exists.

use std::collections::BinaryHeap;

use crate::dag::Dag;
use crate::error::{Error, Result};

/// Topological order of the DAG's tasks, breaking ties by smallest ready
/// task id so that EDF's "stable tie-break by task id" falls out of this
/// function directly.
pub fn topological_order(dag: &Dag) -> Result<Vec<usize>> {
    let n = dag.num_tasks();
    let mut in_degree = vec![0usize; n];
    for task in 0..n {
        for edge in dag.successors(task) {
            in_degree[edge.to] += 1;
        }
    }

    // Min-heap over `Reverse(id)` so the smallest ready id is popped first.
    let mut ready: BinaryHeap<std::cmp::Reverse<usize>> = (0..n)
        .filter(|&t| in_degree[t] == 0)
        .map(std::cmp::Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(std::cmp::Reverse(task)) = ready.pop() {
        order.push(task);
        for edge in dag.successors(task) {
            in_degree[edge.to] -= 1;
            if in_degree[edge.to] == 0 {
                ready.push(std::cmp::Reverse(edge.to));
            }
        }
    }

    if order.len() != n {
        return Err(Error::MalformedGraph(
            "cycle detected while computing topological order".into(),
        ));
    }
    Ok(order)
}

/// Bottom-level of every task: `bl(t) = weight(t)` for sinks, otherwise
/// `weight(t) + max_succ(edge_weight + bl(succ))`.
pub fn bottom_levels(dag: &Dag) -> Result<Vec<f64>> {
    let order = topological_order(dag)?;
    let mut bl = vec![0.0_f64; dag.num_tasks()];
    for &task in order.iter().rev() {
        let succ_term = dag
            .successors(task)
            .iter()
            .map(|edge| edge.weight + bl[edge.to])
            .fold(0.0_f64, f64::max);
        bl[task] = dag.task(task).weight + succ_term;
    }
    Ok(bl)
}

/// Betweenness centrality on the undirected projection of the DAG
/// (Brandes' algorithm, unweighted).
pub fn betweenness_centrality(dag: &Dag) -> Vec<f64> {
    let n = dag.num_tasks();
    let mut centrality = vec![0.0_f64; n];
    if n == 0 {
        return centrality;
    }

    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for task in 0..n {
        for edge in dag.successors(task) {
            neighbors[task].push(edge.to);
            neighbors[edge.to].push(task);
        }
    }

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::new();
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = std::collections::VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &neighbors[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    // Undirected graph: every shortest path is counted from both endpoints.
    for c in centrality.iter_mut() {
        *c /= 2.0;
    }
    centrality
}
