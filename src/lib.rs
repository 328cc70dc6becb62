//! List-scheduling core for annotated task DAGs on heterogeneous resources.
//!
//! Three pure, deterministic schedulers share one data model:
//! [`schedulers::edf::EdfScheduler`], [`schedulers::heft::HeftScheduler`],
//! and [`schedulers::heft_star::HeftStarScheduler`]. Each implements
//! [`scheduler::Scheduler`], whose single `schedule` method takes a
//! [`dag::Dag`] and a [`resource::Resources`] pool and returns a
//! [`schedule::ScheduleResult`] — no I/O, no clock, no shared state between
//! calls.

pub mod community;
pub mod dag;
pub mod error;
pub mod metrics;
pub mod priority;
pub mod resource;
pub mod schedule;
pub mod scheduler;
pub mod schedulers;
pub mod task;

pub use dag::{read_dag_description, Dag};
pub use error::{Error, Result};
pub use resource::{read_resource_pool, Resource, Resources};
pub use schedule::{Schedule, ScheduleEntry, ScheduleResult};
pub use scheduler::Scheduler;
pub use schedulers::edf::EdfScheduler;
pub use schedulers::heft::HeftScheduler;
pub use schedulers::heft_star::HeftStarScheduler;
pub use task::{Edge, Task};
