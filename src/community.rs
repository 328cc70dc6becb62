//! Louvain community detection on the undirected projection of the DAG.
//!
//! Used only by `HeftStarScheduler` to co-locate non-GANG tasks.
//! Determinism comes from a fixed seed driving the only source of
//! nondeterminism in the local-moving phase: the order in which nodes are
//! (re-)considered for a move.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::dag::Dag;

const EPS: f64 = 1e-9;
const MAX_LEVELS: usize = 20;
const MAX_PASSES_PER_LEVEL: usize = 100;

struct Graph {
    n: usize,
    /// Undirected edges with u < v, each stored once.
    edges: Vec<(usize, usize, f64)>,
    /// Self-loop weight per node, in the "half" convention: a node's full
    /// weighted degree is `(sum of incident edge weights) + 2 * self_loop`.
    self_loops: Vec<f64>,
}

impl Graph {
    fn from_dag(dag: &Dag) -> Self {
        let n = dag.num_tasks();
        let mut edges = Vec::new();
        for u in 0..n {
            for edge in dag.successors(u) {
                let v = edge.to;
                if u != v {
                    let (a, b) = if u < v { (u, v) } else { (v, u) };
                    edges.push((a, b, edge.weight));
                }
            }
        }
        Graph {
            n,
            edges,
            self_loops: vec![0.0; n],
        }
    }

    fn total_weight(&self) -> f64 {
        self.edges.iter().map(|&(_, _, w)| w).sum::<f64>() + self.self_loops.iter().sum::<f64>()
    }

    fn adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.n];
        for &(u, v, w) in &self.edges {
            adj[u].push((v, w));
            adj[v].push((u, w));
        }
        adj
    }

    fn degrees(&self, adj: &[Vec<(usize, f64)>]) -> Vec<f64> {
        (0..self.n)
            .map(|v| adj[v].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.self_loops[v])
            .collect()
    }

    /// One level of local moving. Returns the community assigned to each
    /// node of this level's graph, and whether any node moved at all.
    fn local_moving(&self, seed: u64) -> (Vec<usize>, bool) {
        let adj = self.adjacency();
        let k = self.degrees(&adj);
        let m = self.total_weight();

        let mut comm: Vec<usize> = (0..self.n).collect();
        let mut tot: Vec<f64> = k.clone();

        if m <= 0.0 {
            return (comm, false);
        }

        let mut moved_ever = false;
        for pass in 0..MAX_PASSES_PER_LEVEL {
            let mut order: Vec<usize> = (0..self.n).collect();
            let mut rng = Pcg64::seed_from_u64(seed.wrapping_add(pass as u64));
            order.shuffle(&mut rng);

            let mut moved_this_pass = false;
            for &i in &order {
                let cur = comm[i];
                tot[cur] -= k[i];

                let mut gains: BTreeMap<usize, f64> = BTreeMap::new();
                for &(j, w) in &adj[i] {
                    if j != i {
                        *gains.entry(comm[j]).or_insert(0.0) += w;
                    }
                }

                let mut best_comm = cur;
                let mut best_gain = gains.get(&cur).copied().unwrap_or(0.0) - tot[cur] * k[i] / (2.0 * m);
                for (&c, &k_in) in &gains {
                    let gain = k_in - tot[c] * k[i] / (2.0 * m);
                    if gain > best_gain + EPS {
                        best_gain = gain;
                        best_comm = c;
                    }
                }

                tot[best_comm] += k[i];
                comm[i] = best_comm;
                if best_comm != cur {
                    moved_this_pass = true;
                    moved_ever = true;
                }
            }
            if !moved_this_pass {
                break;
            }
        }

        (comm, moved_ever)
    }

    /// Relabels communities to a contiguous `0..k` range, ordered by the
    /// smallest original member id, for determinism.
    fn relabel(comm: &[usize]) -> Vec<usize> {
        let mut first_seen: BTreeMap<usize, usize> = BTreeMap::new();
        for (node, &c) in comm.iter().enumerate() {
            first_seen.entry(c).or_insert(node);
        }
        let mut ids: Vec<usize> = first_seen.keys().copied().collect();
        ids.sort_by_key(|&c| first_seen[&c]);
        let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
        for (new_id, old_id) in ids.into_iter().enumerate() {
            remap.insert(old_id, new_id);
        }
        comm.iter().map(|c| remap[c]).collect()
    }

    fn aggregate(&self, comm: &[usize], num_communities: usize) -> Graph {
        let mut self_loops = vec![0.0; num_communities];
        for (v, &sl) in self.self_loops.iter().enumerate() {
            self_loops[comm[v]] += sl;
        }
        let mut cross: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(u, v, w) in &self.edges {
            let (cu, cv) = (comm[u], comm[v]);
            if cu == cv {
                self_loops[cu] += w;
            } else {
                let key = if cu < cv { (cu, cv) } else { (cv, cu) };
                *cross.entry(key).or_insert(0.0) += w;
            }
        }
        let edges = cross.into_iter().map(|((a, b), w)| (a, b, w)).collect();
        Graph {
            n: num_communities,
            edges,
            self_loops,
        }
    }
}

/// Runs deterministic Louvain modularity optimization on the undirected
/// projection of `dag` and returns a community id per task, seeded for
/// reproducibility. Isolated tasks fall out of the algorithm naturally as
/// singleton communities (they have zero weighted degree and never have a
/// positive gain to join any other community).
pub fn detect_communities(dag: &Dag, seed: u64) -> Vec<usize> {
    let n = dag.num_tasks();
    if n == 0 {
        return Vec::new();
    }

    let mut graph = Graph::from_dag(dag);
    // composed[v] = current-level community of original task v.
    let mut composed: Vec<usize> = (0..n).collect();

    for level in 0..MAX_LEVELS {
        let (comm, moved) = graph.local_moving(seed.wrapping_add(level as u64 * 1_000_003));
        let relabeled = Graph::relabel(&comm);
        let num_communities = relabeled.iter().copied().max().map_or(0, |m| m + 1);

        composed = composed.iter().map(|&c| relabeled[c]).collect();

        if !moved || num_communities == graph.n {
            break;
        }
        graph = graph.aggregate(&relabeled, num_communities);
    }

    composed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_tasks_are_singleton_communities() {
        let mut dag = Dag::new();
        dag.add_task(1.0, 1).unwrap();
        dag.add_task(1.0, 1).unwrap();
        dag.add_task(1.0, 1).unwrap();
        let comm = detect_communities(&dag, 42);
        assert_eq!(comm.len(), 3);
        assert_ne!(comm[0], comm[1]);
        assert_ne!(comm[1], comm[2]);
    }

    #[test]
    fn deterministic_across_runs() {
        let mut dag = Dag::new();
        for _ in 0..8 {
            dag.add_task(1.0, 1).unwrap();
        }
        for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (6, 7)] {
            dag.add_edge(u, v, 1.0).unwrap();
        }
        let a = detect_communities(&dag, 42);
        let b = detect_communities(&dag, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn strongly_connected_path_ends_up_in_one_community() {
        let mut dag = Dag::new();
        for _ in 0..3 {
            dag.add_task(1.0, 1).unwrap();
        }
        dag.add_edge(0, 1, 5.0).unwrap();
        dag.add_edge(1, 2, 5.0).unwrap();
        let comm = detect_communities(&dag, 42);
        assert_eq!(comm[0], comm[1]);
        assert_eq!(comm[1], comm[2]);
    }
}
