//! DAG model of computation.
//!
//! Tasks are addressed by index into an internal `Vec<Task>`; successor and
//! predecessor adjacency lists are built alongside it as edges are added.
//! A `Dag` is handed to a scheduler once and never mutated during
//! scheduling.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::task::{Edge, Task};

/// An immutable (once built) annotated directed acyclic graph of tasks.
#[derive(Clone, Debug, Default)]
pub struct Dag {
    tasks: Vec<Task>,
    successors: Vec<Vec<Edge>>,
    predecessors: Vec<Vec<Edge>>,
}

impl Dag {
    /// Creates an empty DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task and returns its id.
    pub fn add_task(&mut self, weight: f64, num_cores: u32) -> Result<usize> {
        if num_cores < 1 {
            return Err(Error::InvalidConfig(format!(
                "task num_cores must be >= 1, got {num_cores}"
            )));
        }
        if weight <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "task weight must be positive, got {weight}"
            )));
        }
        let id = self.tasks.len();
        self.tasks.push(Task::new(weight, num_cores));
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        Ok(id)
    }

    /// Adds a directed edge `from -> to` with the given communication weight.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        if from >= self.tasks.len() || to >= self.tasks.len() {
            return Err(Error::MalformedGraph(format!(
                "edge references unknown task: {from} -> {to}"
            )));
        }
        if weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "edge weight must be non-negative, got {weight}"
            )));
        }
        self.successors[from].push(Edge { to, weight });
        self.predecessors[to].push(Edge { to: from, weight });
        Ok(())
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn task(&self, id: usize) -> &Task {
        &self.tasks[id]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Outgoing edges of `id`, i.e. `(successor, edge_weight)` pairs.
    pub fn successors(&self, id: usize) -> &[Edge] {
        &self.successors[id]
    }

    /// Incoming edges of `id`, i.e. `(predecessor, edge_weight)` pairs.
    pub fn predecessors(&self, id: usize) -> &[Edge] {
        &self.predecessors[id]
    }
}

#[derive(Debug, Deserialize)]
struct TaskDescription {
    weight: f64,
    #[serde(default = "one_core")]
    num_cores: u32,
}

fn one_core() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct EdgeDescription {
    from: usize,
    to: usize,
    #[serde(default)]
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct DagDescription {
    tasks: Vec<TaskDescription>,
    #[serde(default)]
    edges: Vec<EdgeDescription>,
}

/// Reads a task DAG from a JSON description: a flat list of tasks (each
/// with a weight and optional `num_cores`) plus an explicit edge list.
pub fn read_dag_description<P: AsRef<Path>>(file: P) -> Result<Dag> {
    let contents = std::fs::read_to_string(&file)
        .map_err(|e| Error::InvalidConfig(format!("can't read {}: {e}", file.as_ref().display())))?;
    let description: DagDescription = serde_json::from_str(&contents)
        .map_err(|e| Error::InvalidConfig(format!("can't parse JSON from {}: {e}", file.as_ref().display())))?;

    let mut dag = Dag::new();
    for task in &description.tasks {
        dag.add_task(task.weight, task.num_cores)?;
    }
    for edge in &description.edges {
        dag.add_edge(edge.from, edge.to, edge.weight)?;
    }
    Ok(dag)
}
