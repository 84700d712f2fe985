//! Synthetic workload runner
//!
//! Spreads sleeping jobs across a set of `JobsExecutor`s sharing one pool,
//! plus one batch submitted directly and tracked with a `JobCounter`, then
//! reports what ran.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cli::Output;
use crate::config::PoolConfig;
use crate::parallel::{JobCounter, JobsExecutor, WorkerPool};

#[derive(Args)]
pub struct RunArgs {
    /// Number of worker threads (overrides configuration, 0 = one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Number of jobs to submit
    #[arg(short, long, default_value_t = 100)]
    pub jobs: usize,

    /// How long each job sleeps, in milliseconds
    #[arg(long, default_value_t = 10)]
    pub job_ms: u64,

    /// Number of executors sharing the pool
    #[arg(short, long, default_value_t = 2)]
    pub executors: usize,

    /// Make the first N jobs panic
    #[arg(long, default_value_t = 0)]
    pub fail: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub workers: usize,
    pub executors: usize,
    pub jobs: usize,
    pub completed: usize,
    pub failed: usize,
    pub peak_busy_workers: usize,
    pub elapsed_ms: u128,
}

pub fn execute(args: RunArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let mut config = PoolConfig::load(custom_config)?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.fail > args.jobs {
        anyhow::bail!("Cannot fail {} jobs out of {}", args.fail, args.jobs);
    }

    let pool = WorkerPool::with_config(&config)?;
    info!(
        workers = pool.num_workers(),
        jobs = args.jobs,
        executors = args.executors,
        "starting workload"
    );

    let report = run_workload(&pool, &args);
    print_report(&report, args.json, output)?;

    if report.failed > 0 {
        anyhow::bail!("{} of {} jobs failed", report.failed, report.jobs);
    }
    if report.completed != report.jobs {
        anyhow::bail!("Only {} of {} jobs completed", report.completed, report.jobs);
    }
    Ok(())
}

fn run_workload(pool: &WorkerPool, args: &RunArgs) -> RunReport {
    let completed = Arc::new(AtomicUsize::new(0));
    let job_duration = Duration::from_millis(args.job_ms);
    let started = Instant::now();

    let executors: Vec<JobsExecutor<'_>> =
        (0..args.executors).map(|_| JobsExecutor::new(pool)).collect();
    let direct = JobCounter::new();
    let sampling = AtomicBool::new(true);
    let peak_busy = AtomicUsize::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            while sampling.load(Ordering::Acquire) {
                peak_busy.fetch_max(pool.num_busy_workers(), Ordering::Relaxed);
                thread::sleep(Duration::from_millis(1));
            }
        });

        // one slot per executor plus the directly submitted batch
        let lanes = executors.len() + 1;
        for index in 0..args.jobs {
            let completed = completed.clone();
            let fails = index < args.fail;
            let job = move || {
                thread::sleep(job_duration);
                if fails {
                    panic!("injected failure in job {index}");
                }
                completed.fetch_add(1, Ordering::Relaxed);
            };

            match executors.get(index % lanes) {
                Some(executor) => executor.submit(job),
                None => {
                    let guard = direct.track();
                    pool.submit(move || {
                        // released on unwind as well
                        let _guard = guard;
                        job();
                    });
                }
            }
        }

        for (lane, executor) in executors.iter().enumerate() {
            executor.drain();
            debug!(lane, "executor drained");
        }
        direct.wait_for_completion();
        debug!("direct batch drained");

        pool.drain();
        sampling.store(false, Ordering::Release);
    });

    RunReport {
        workers: pool.num_workers(),
        executors: args.executors,
        jobs: args.jobs,
        completed: completed.load(Ordering::Relaxed),
        failed: pool.take_failures().len(),
        peak_busy_workers: peak_busy.load(Ordering::Relaxed),
        elapsed_ms: started.elapsed().as_millis(),
    }
}

fn print_report(report: &RunReport, json: bool, output: &Output) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    output.header("Workload Report");
    output.key_value("Workers:", &report.workers.to_string(), false);
    output.key_value("Executors:", &report.executors.to_string(), false);
    output.key_value("Jobs submitted:", &report.jobs.to_string(), false);
    output.key_value("Jobs completed:", &report.completed.to_string(), true);
    output.key_value("Peak busy workers:", &report.peak_busy_workers.to_string(), false);
    output.key_value("Elapsed:", &format!("{} ms", report.elapsed_ms), false);
    output.blank_line();

    if report.failed == 0 {
        output.status_indicator("OK", "all jobs completed", true);
    } else {
        output.status_indicator("FAILED", &format!("{} jobs panicked", report.failed), false);
    }
    Ok(())
}
