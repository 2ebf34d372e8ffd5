//! mlfq-sim: run a workload through the MLFQ engine and optionally compare it
//! against FCFS, SJF and Round-Robin.

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::num::NonZeroU64;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mlfq_model::{
    Comparison, Job, Metrics, Mlfq, RunOutcome, SchedulerConfig, SimEvent, Slot,
    input::{self, ConfigSource},
    scheduler::{RoundRobinScheduler, mlfq},
    sim::workload::bernoulli_jobs,
};

// Detailed timeline rows are cut off after this many units
const TIMELINE_PREVIEW: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "mlfq-sim")]
#[command(about = "Simulate a multilevel feedback queue scheduler", long_about = None)]
struct Args {
    /// Process list file (`N` then `N` lines of `id arrival burst`); stdin when absent
    input: Option<PathBuf>,

    /// Load the scheduler configuration, falling back to defaults if unusable
    #[arg(short, long, num_args = 0..=1, default_missing_value = "config.txt")]
    config: Option<PathBuf>,

    /// Also run Round Robin, FCFS and SJF on the same workload
    #[arg(long)]
    compare: bool,

    /// Quantum of the Round-Robin baseline [default: 4]
    #[arg(long)]
    rr_quantum: Option<NonZeroU64>,

    /// Generate a synthetic workload over this many ticks instead of reading input
    #[arg(long, conflicts_with = "input")]
    random: Option<u64>,

    /// Seed for --random
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write results as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Do not log per-tick scheduling events
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a SchedulerConfig,
    mlfq: &'a RunOutcome,
    metrics: Metrics,
    comparison: Option<&'a Comparison>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let jobs = load_jobs(&args)?;
    println!("Loaded {} processes", jobs.len());

    let (config, source) = input::load_config_or_default(args.config.as_deref());
    match &source {
        ConfigSource::File(path) => println!("Configuration loaded from {}", path.display()),
        ConfigSource::Fallback { path, reason } => {
            println!("Could not use {} ({reason}), using default configuration", path.display())
        }
        ConfigSource::Default => println!("Using default configuration"),
    }
    print_config(&config);
    println!();

    let mut engine = Mlfq::new(&jobs, config.clone());
    while !engine.is_finished() {
        let now = engine.now();
        let events = engine.step();
        if !args.quiet {
            for event in &events {
                log_event(now, event);
            }
        }
    }

    let outcome = mlfq::outcome(&engine);
    let metrics = outcome.metrics();
    print_process_table(&outcome);
    print_level_usage(&outcome, &config);
    print_metrics("MLFQ", &metrics);
    print_gantt(&outcome);

    let comparison = args.compare.then(|| {
        let rr_quantum = args
            .rr_quantum
            .unwrap_or_else(|| RoundRobinScheduler::default().quantum());
        Comparison::run(&jobs, &config, rr_quantum)
    });
    if let Some(comparison) = &comparison {
        print_comparison(comparison);
    }

    if let Some(path) = &args.json {
        let report = Report {
            config: &config,
            mlfq: &outcome,
            metrics,
            comparison: comparison.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "results saved");
    }

    Ok(())
}

fn load_jobs(args: &Args) -> anyhow::Result<Vec<Job>> {
    if let Some(ticks) = args.random {
        let jobs = bernoulli_jobs(ticks, 0.3, 0.3, 2, 6, args.seed);
        if jobs.is_empty() {
            bail!("no processes generated over {ticks} ticks with seed {}", args.seed);
        }
        return Ok(jobs);
    }

    match &args.input {
        Some(path) => input::load_jobs(path)
            .with_context(|| format!("cannot load processes from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading processes from stdin")?;
            Ok(input::parse_jobs(&text).context("parsing processes from stdin")?)
        }
    }
}

fn log_event(now: u64, event: &SimEvent) {
    match event {
        SimEvent::Arrived { pid } => info!("t={now} P{pid} arrived -> Q0"),
        SimEvent::Promoted { pid, from, to } => {
            info!("t={now} P{pid} promoted Q{from} -> Q{to} (aging)")
        }
        SimEvent::Boosted { moved, running } => info!(
            "t={now} priority boost: {} waiting moved to Q0, running reset: {running:?}",
            moved.len()
        ),
        SimEvent::Preempted { pid, level } => info!("t={now} P{pid} preempted in Q{level}"),
        SimEvent::Dispatched { pid, level, first_run } => {
            debug!("t={now} P{pid} dispatched from Q{level} (first run: {first_run})")
        }
        SimEvent::CpuIdle => debug!("t={now} CPU idle"),
        SimEvent::Demoted { pid, from, to } => {
            info!("t={} P{pid} demoted Q{from} -> Q{to} (quantum exhausted)", now + 1)
        }
        SimEvent::Requeued { pid, level } => {
            info!("t={} P{pid} requeued in Q{level} (quantum exhausted)", now + 1)
        }
        SimEvent::Completed { pid, level, at } => info!("t={at} P{pid} completed in Q{level}"),
    }
}

fn print_config(config: &SchedulerConfig) {
    println!("  Number of Queues: {}", config.num_levels());
    for level in 0..config.num_levels() {
        match config.quantum(level) {
            0 => println!("  Q{level}: {}", config.label(level)),
            q => println!("  Q{level}: {} (TQ={q})", config.label(level)),
        }
    }
    println!("  Aging Threshold: {} time units", config.aging_threshold);
    println!("  Aging Check Interval: every {} time units", config.aging_check_interval);
    println!("  Priority Boost Interval: every {} time units", config.boost_interval);
}

fn print_process_table(outcome: &RunOutcome) {
    println!("\nPID\tArrival\tBurst\tStart\tCompletion\tTurnaround\tWaiting");
    for r in &outcome.records {
        println!(
            "{}\t{}\t{}\t{}\t{}\t\t{}\t\t{}",
            r.id,
            r.arrival_time,
            r.original_burst,
            fmt_opt(r.start_time),
            fmt_opt(r.completion_time),
            fmt_opt(r.turnaround()),
            fmt_opt(r.waiting()),
        );
    }
}

fn print_level_usage(outcome: &RunOutcome, config: &SchedulerConfig) {
    let usage = outcome.timeline.level_usage(config.num_levels());
    let busy = outcome.busy_ticks.max(1) as f64;
    println!("\nQueue Usage:");
    for (level, ticks) in usage.iter().enumerate() {
        println!(
            "  Q{level} ({}): {ticks} time units ({:.1}%)",
            config.label(level),
            100.0 * *ticks as f64 / busy
        );
    }
}

fn print_metrics(name: &str, m: &Metrics) {
    println!("\n{name} Performance:");
    println!("  Avg Turnaround Time: {:.2}", m.avg_turnaround);
    println!("  Avg Waiting Time   : {:.2}", m.avg_waiting);
    println!("  Throughput         : {:.3} jobs/unit", m.throughput);
    println!("  CPU Utilization    : {:.2} %", m.cpu_utilization);
    println!("  Context Switches   : {}", m.context_switches);
}

fn print_gantt(outcome: &RunOutcome) {
    let timeline = &outcome.timeline;
    if timeline.is_empty() {
        return;
    }

    println!("\nGantt Chart:");
    for segment in timeline.segments() {
        match segment.slot {
            Slot::Idle => println!("[Idle] {}->{}", segment.start, segment.end),
            Slot::Busy { pid, level } => {
                println!("P{pid} [Q{level}] {}->{}", segment.start, segment.end)
            }
        }
    }

    let shown = &timeline.slots()[..timeline.len().min(TIMELINE_PREVIEW)];
    let more = if timeline.len() > shown.len() { " ..." } else { "" };
    let times: String = (0..shown.len()).map(|t| format!("{t:>4}")).collect();
    let procs: String = shown
        .iter()
        .map(|s| match s {
            Slot::Idle => format!("{:>4}", "-"),
            Slot::Busy { pid, .. } => format!("{:>4}", format!("P{pid}")),
        })
        .collect();
    let levels: String = shown
        .iter()
        .map(|s| match s {
            Slot::Idle => format!("{:>4}", "-"),
            Slot::Busy { level, .. } => format!("{:>4}", format!("Q{level}")),
        })
        .collect();
    println!("\nTime: {times}{more}");
    println!("Proc: {procs}{more}");
    println!("Queue:{levels}{more}");
}

fn print_comparison(comparison: &Comparison) {
    println!(
        "\n{:<15}{:>12}{:>12}{:>12}{:>12}{:>12}",
        "Algorithm", "Avg TAT", "Avg WT", "Throughput", "CPU Util%", "Ctx Switch"
    );
    println!("{}", "-".repeat(75));
    for entry in &comparison.entries {
        let m = &entry.metrics;
        println!(
            "{:<15}{:>12.2}{:>12.2}{:>12.3}{:>12.2}{:>12}",
            entry.scheduler,
            m.avg_turnaround,
            m.avg_waiting,
            m.throughput,
            m.cpu_utilization,
            m.context_switches
        );
    }

    if let Some(best) = comparison.best_turnaround() {
        println!(
            "\nBest Average Turnaround Time: {} ({:.2})",
            best.scheduler, best.metrics.avg_turnaround
        );
    }
    if let Some(best) = comparison.best_waiting() {
        println!(
            "Best Average Waiting Time: {} ({:.2})",
            best.scheduler, best.metrics.avg_waiting
        );
    }
}

fn fmt_opt(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
