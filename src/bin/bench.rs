//! CLI entry point: `generate`/`process`/`batch-process`/`download` are
//! shape-only stubs (graph generation, persistence and dataset download are
//! out of scope for the scheduling core); `benchmark` and `batch-benchmark`
//! load a DAG and resource pool and run EDF, HEFT and HEFT* against them.
//!
//! One `clap::Parser` struct per subcommand, `env_logger` initialized from
//! the default env at the top of `main`.

use std::io::Write;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::{Parser, Subcommand};
use env_logger::Builder;
use threadpool::ThreadPool;

use dag_sched_bench::{
    read_dag_description, read_resource_pool, Dag, EdfScheduler, HeftScheduler, HeftStarScheduler, Resources,
    ScheduleResult, Scheduler,
};

#[derive(Parser, Debug)]
#[command(name = "bench", about = "DAG scheduling benchmark CLI", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic graph (not implemented here).
    Generate {
        #[arg(long = "graph-type")]
        graph_type: String,
    },
    /// Download datasets (not implemented here).
    Download {
        #[arg(long = "type")]
        dataset_type: String,
    },
    /// Process a single dataset (not implemented here).
    Process {
        #[arg(long)]
        input: String,
    },
    /// Process multiple datasets (not implemented here).
    BatchProcess {
        #[arg(long = "type")]
        dataset_type: String,
    },
    /// Run EDF, HEFT and HEFT* against one DAG and resource pool.
    Benchmark {
        /// Path to a DAG description in JSON.
        #[arg(long)]
        dag: String,
        /// Path to a resource pool description in YAML.
        #[arg(long)]
        resources: String,
    },
    /// Run EDF, HEFT and HEFT* against several (DAG, resource pool) pairs
    /// concurrently.
    BatchBenchmark {
        /// Paths to DAG descriptions in JSON.
        #[arg(long, num_args = 1.., required = true)]
        dags: Vec<String>,
        /// Path to a resource pool description in YAML, shared by every DAG.
        #[arg(long)]
        resources: String,
        /// Number of worker threads.
        #[arg(long, default_value_t = 4)]
        threads: usize,
    },
}

/// Stub subcommands report this and exit non-zero rather than silently
/// doing nothing; this crate implements the scheduling core only, not graph
/// generation, dataset I/O or visualization.
fn not_implemented_here(what: &str) -> ExitCode {
    eprintln!("error: '{what}' is not implemented in this crate (out of scope: see Non-goals)");
    ExitCode::FAILURE
}

fn print_result(label: &str, result: &ScheduleResult) {
    println!("{label}: makespan={:.6} avg_utilization={:.6}", result.makespan, result.avg_utilization);
    if !result.unscheduled.is_empty() {
        println!("{label}: unscheduled tasks = {:?}", result.unscheduled);
    }
}

fn run_all_schedulers(dag: &Dag, resources: &Resources) -> dag_sched_bench::Result<()> {
    print_result("edf", &EdfScheduler::new().schedule(dag, resources)?);
    print_result("heft", &HeftScheduler::new().schedule(dag, resources)?);
    print_result("heft*", &HeftStarScheduler::new().schedule(dag, resources)?);
    Ok(())
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate { .. } => not_implemented_here("generate"),
        Command::Download { .. } => not_implemented_here("download"),
        Command::Process { .. } => not_implemented_here("process"),
        Command::BatchProcess { .. } => not_implemented_here("batch-process"),

        Command::Benchmark { dag, resources } => {
            let dag = match read_dag_description(&dag) {
                Ok(dag) => dag,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            let resources = match read_resource_pool(&resources) {
                Ok(resources) => resources,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match run_all_schedulers(&dag, &resources) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }

        Command::BatchBenchmark { dags, resources, threads } => {
            let resources = match read_resource_pool(&resources) {
                Ok(resources) => resources,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };

            let pool = ThreadPool::new(threads);
            let (tx, rx) = mpsc::channel();
            let total = dags.len();

            for dag_path in dags {
                let resources = resources.clone();
                let tx = tx.clone();
                pool.execute(move || {
                    let outcome = read_dag_description(&dag_path).and_then(|dag| {
                        let edf = EdfScheduler::new().schedule(&dag, &resources)?;
                        let heft = HeftScheduler::new().schedule(&dag, &resources)?;
                        let heft_star = HeftStarScheduler::new().schedule(&dag, &resources)?;
                        Ok((dag_path, edf, heft, heft_star))
                    });
                    tx.send(outcome).expect("receiver dropped before all runs completed");
                });
            }
            drop(tx);

            let mut failures = 0usize;
            for outcome in rx.iter().take(total) {
                match outcome {
                    Ok((dag_path, edf, heft, heft_star)) => {
                        println!("=== {dag_path} ===");
                        print_result("edf", &edf);
                        print_result("heft", &heft);
                        print_result("heft*", &heft_star);
                    }
                    Err(e) => {
                        eprintln!("error: {e}");
                        failures += 1;
                    }
                }
            }
            pool.join();

            if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
