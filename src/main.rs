use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use u_jobsim::config::SimConfig;
use u_jobsim::dispatching::QueuePolicy;
use u_jobsim::report;
use u_jobsim::scheduler::PlacementPolicy;

#[derive(Parser)]
#[command(
    name = "u-jobsim",
    about = "Discrete-time job scheduling simulator",
    version,
    propagate_version = true
)]
struct Cli {
    /// TOML simulation config (defaults apply to anything missing)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one queueing/placement policy pair and print its KPIs
    Run {
        /// Queueing policy: fcfs, sjf, sdf (or 0, 1, 2)
        #[arg(short, long)]
        queue: Option<QueuePolicy>,
        /// Placement policy: first-fit, best-fit, worst-fit (or 0, 1, 2)
        #[arg(short, long)]
        placement: Option<PlacementPolicy>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Simulate every policy pair and write average utilizations as CSV
    Sweep {
        /// Output CSV path
        #[arg(short, long, default_value = "utilization.csv")]
        output: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Ticks to simulate
    #[arg(short, long)]
    ticks: Option<u64>,
    /// Generate this many synthetic jobs instead of the configured ones
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Seed for synthetic jobs
    #[arg(short, long)]
    seed: Option<u64>,
}

impl CommonArgs {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if self.jobs.is_some() || self.seed.is_some() {
            let mut workload = config.workload.unwrap_or_default();
            if let Some(job_count) = self.jobs {
                workload.job_count = job_count;
            }
            if let Some(seed) = self.seed {
                workload.seed = seed;
            }
            config.workload = Some(workload);
            config.jobs.clear();
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SimConfig> {
    match path {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SimConfig::default()),
    }
}

fn run(config: SimConfig) -> anyhow::Result<()> {
    let mut scheduler = config.build_scheduler()?;
    info!(
        queue = %config.queue_policy,
        placement = %config.placement_policy,
        nodes = config.cluster.node_count,
        jobs = scheduler.records().len(),
        ticks = config.ticks,
        "starting simulation"
    );
    scheduler.run(config.ticks);

    let kpi = scheduler.kpi();
    println!("queue policy:       {}", config.queue_policy);
    println!("placement policy:   {}", config.placement_policy);
    println!("ticks:              {}", kpi.utilization.ticks);
    println!("avg cpu:            {:.4}", kpi.utilization.avg_cpu);
    println!("avg memory:         {:.4}", kpi.utilization.avg_memory);
    println!("peak cpu:           {:.4}", kpi.utilization.peak_cpu);
    println!("peak memory:        {:.4}", kpi.utilization.peak_memory);
    println!("current cpu:        {:.4}", scheduler.current_cpu_utilization());
    println!("current memory:     {:.4}", scheduler.current_memory_utilization());
    println!(
        "jobs:               {} submitted, {} placed, {} completed, {} pending",
        kpi.jobs_submitted, kpi.jobs_placed, kpi.jobs_completed, kpi.jobs_pending
    );
    println!("avg wait (ticks):   {:.2}", kpi.avg_wait_ticks);
    println!("max wait (ticks):   {}", kpi.max_wait_ticks);
    Ok(())
}

fn sweep(config: &SimConfig, output: &Path) -> anyhow::Result<()> {
    let jobs = config.jobs()?;
    let rows = report::sweep(&config.cluster, &jobs, config.ticks)?;
    report::write_csv_file(output, &rows)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(rows = rows.len(), output = %output.display(), "sweep written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("u_jobsim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            queue,
            placement,
            common,
        } => {
            if let Some(queue) = queue {
                config.queue_policy = queue;
            }
            if let Some(placement) = placement {
                config.placement_policy = placement;
            }
            common.apply(&mut config);
            run(config)
        }
        Commands::Sweep { output, common } => {
            common.apply(&mut config);
            sweep(&config, &output)
        }
    }
}
