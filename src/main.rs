use allocator::FairBandit;
use anyhow::Context;
use backtester::{BacktestEngine, BattleOutcome, Contender, run_battle};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, ZeroVariancePolicy, load_config};
use core_types::ParameterSet;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use optimizer::Optimizer;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use strategies::{BuiltinLoader, ParameterSchema, StrategyId, create_strategy};

mod prices;
mod telemetry;

/// The main entry point for the Alpha Arena application.
#[tokio::main]
async fn main() {
    // `.env` is optional; it only feeds `ARENA__*` overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => exit_with_error(&anyhow::Error::new(e).context("Failed to load configuration")),
    };

    let _guard = match telemetry::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => exit_with_error(&e),
    };

    let outcome = match cli.command {
        Commands::Backtest(args) => handle_backtest(args, &config),
        Commands::Optimize(args) => handle_optimize(args, &config).await,
        Commands::Battle(args) => handle_battle(args, &config),
        Commands::Allocate(args) => handle_allocate(args, &config),
        Commands::Strategies => handle_strategies(),
    };

    if let Err(e) = outcome {
        tracing::error!(error = %format!("{:#}", e), "Command failed.");
        exit_with_error(&e);
    }
}

/// Fatal errors replace the command's output with a single JSON payload.
fn exit_with_error(error: &anyhow::Error) -> ! {
    let payload = serde_json::json!({ "error": format!("{:#}", error) });
    println!("{}", payload);
    std::process::exit(1);
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtest, tune and allocate capital across trading strategies.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one strategy over a price file and print its metrics.
    Backtest(BacktestArgs),
    /// Hill-climb a strategy's parameters, streaming NDJSON progress records.
    Optimize(OptimizeArgs),
    /// Run several strategies side by side against a buy-and-hold benchmark.
    Battle(BattleArgs),
    /// Compute fairness-blended capital weights from win/loss outcomes.
    Allocate(AllocateArgs),
    /// List the built-in strategies and their tunable parameters.
    Strategies,
}

#[derive(Parser)]
struct BacktestArgs {
    /// The strategy source (e.g., "golden_cross").
    #[arg(long)]
    strategy: String,

    /// JSON array of price bars.
    #[arg(long)]
    prices: PathBuf,

    /// Parameter override as NAME=VALUE. May be repeated.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, i64)>,

    /// Overrides `backtest.zero_variance` from the configuration.
    #[arg(long, value_enum)]
    zero_variance: Option<ZeroVariancePolicy>,
}

#[derive(Parser)]
struct OptimizeArgs {
    #[arg(long)]
    strategy: String,

    #[arg(long)]
    prices: PathBuf,

    /// Seed for a reproducible search. Overrides `optimizer.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides `optimizer.episodes`.
    #[arg(long)]
    episodes: Option<u32>,
}

#[derive(Parser)]
struct BattleArgs {
    /// A contender's strategy source. Repeat for each contender.
    #[arg(long = "strategy", required = true)]
    strategies: Vec<String>,

    #[arg(long)]
    prices: PathBuf,

    /// Parameter override for one contender as SOURCE.NAME=VALUE. May be repeated.
    #[arg(long = "param", value_parser = parse_contender_param)]
    params: Vec<(String, String, i64)>,

    /// Print the full report as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Also allocate capital from the battle's outcomes at this fairness.
    #[arg(long)]
    fairness: Option<u8>,
}

#[derive(Parser)]
struct AllocateArgs {
    /// Number of arms.
    #[arg(long)]
    arms: usize,

    /// 0 chases performance, 100 splits evenly. Defaults to `allocator.fairness`.
    #[arg(long)]
    fairness: Option<u8>,

    /// Record a win for this arm index. May be repeated.
    #[arg(long = "win")]
    wins: Vec<usize>,

    /// Record a loss for this arm index. May be repeated.
    #[arg(long = "loss")]
    losses: Vec<usize>,

    /// Overrides `allocator.seed`.
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_contender_param(raw: &str) -> Result<(String, String, i64), String> {
    let (source, param) = raw
        .split_once('.')
        .ok_or_else(|| format!("expected SOURCE.NAME=VALUE, got '{}'", raw))?;
    let (name, value) = parse_param(param)?;
    Ok((source.trim().to_string(), name, value))
}

fn parse_param(raw: &str) -> Result<(String, i64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_backtest(args: BacktestArgs, config: &Config) -> anyhow::Result<()> {
    let series = prices::load(&args.prices)?;

    let mut settings = config.backtest.clone();
    if let Some(policy) = args.zero_variance {
        settings.zero_variance = policy;
    }
    let engine = BacktestEngine::new(&settings);

    let params: Option<ParameterSet> =
        (!args.params.is_empty()).then(|| args.params.into_iter().collect());
    let result = engine
        .run_source(&BuiltinLoader, &args.strategy, params.as_ref(), &series)
        .with_context(|| format!("Backtest of '{}' failed", args.strategy))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn handle_optimize(args: OptimizeArgs, config: &Config) -> anyhow::Result<()> {
    let series = prices::load(&args.prices)?;

    let mut settings = config.optimizer.clone();
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(episodes) = args.episodes {
        settings.episodes = episodes;
    }
    let optimizer = Optimizer::new(
        BacktestEngine::new(&config.backtest),
        Arc::new(BuiltinLoader),
        settings,
    )?;
    // Announcement, one record per episode, completion marker and summary.
    let total_records = u64::from(optimizer.settings().episodes) + 3;
    let mut records = optimizer
        .stream(&args.strategy, series)
        .with_context(|| format!("Optimization of '{}' failed", args.strategy))?;

    let progress_bar = ProgressBar::new(total_records);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut stdout = std::io::stdout();
    while let Some(record) = records.next().await {
        stdout.write_all(record.to_ndjson()?.as_bytes())?;
        stdout.flush()?;
        progress_bar.set_message(record.log().to_string());
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Optimization complete!");
    Ok(())
}

fn handle_battle(args: BattleArgs, config: &Config) -> anyhow::Result<()> {
    let series = prices::load(&args.prices)?;
    let engine = BacktestEngine::new(&config.backtest);
    let contenders = contenders(&args.strategies, &args.params)?;

    let report = run_battle(&engine, &BuiltinLoader, &contenders, &series);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Strategy", "Sharpe", "Return %", "Max DD %", "Beat Benchmark"]);
        for entry in &report.entries {
            let row = match &entry.outcome {
                BattleOutcome::Completed { result, beat_benchmark } => vec![
                    entry.name.clone(),
                    result.sharpe_ratio.map_or("n/a".to_string(), |s| format!("{:.2}", s)),
                    format!("{:.2}", result.total_return_pct),
                    format!("{:.2}", result.max_drawdown_pct),
                    if *beat_benchmark { "yes" } else { "no" }.to_string(),
                ],
                BattleOutcome::Failed { error } => vec![
                    entry.name.clone(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    format!("error: {}", error),
                ],
            };
            table.add_row(row);
        }
        println!("Benchmark (buy & hold): {:.2}%", report.benchmark_return_pct);
        println!("{table}");
    }

    if let Some(fairness) = args.fairness {
        let mut bandit = bandit(contenders.len(), config.allocator.seed)?;
        for (arm, entry) in report.entries.iter().enumerate() {
            if let Some(won) = entry.reward() {
                bandit.update(arm, won)?;
            }
        }
        let weights = bandit.calculate_allocation(fairness)?;
        for (entry, weight) in report.entries.iter().zip(&weights) {
            println!("{:<20} {:>6.2}%", entry.name, weight * 100.0);
        }
    }
    Ok(())
}

/// Builds one contender per source, attaching the overrides addressed to it.
fn contenders(
    sources: &[String],
    params: &[(String, String, i64)],
) -> anyhow::Result<Vec<Contender>> {
    if let Some((source, _, _)) = params.iter().find(|(source, _, _)| !sources.contains(source)) {
        anyhow::bail!("--param targets '{}', which is not a contender", source);
    }
    Ok(sources
        .iter()
        .map(|source| {
            let overrides: ParameterSet = params
                .iter()
                .filter(|(target, _, _)| target == source)
                .map(|(_, name, value)| (name.clone(), *value))
                .collect();
            let contender = Contender::new(source);
            if overrides.is_empty() {
                contender
            } else {
                contender.with_params(overrides)
            }
        })
        .collect())
}

fn handle_allocate(args: AllocateArgs, config: &Config) -> anyhow::Result<()> {
    let mut bandit = bandit(args.arms, args.seed.or(config.allocator.seed))?;
    for arm in args.wins {
        bandit.update(arm, true)?;
    }
    for arm in args.losses {
        bandit.update(arm, false)?;
    }

    let fairness = args.fairness.unwrap_or(config.allocator.fairness);
    let weights = bandit.calculate_allocation(fairness)?;
    let payload = serde_json::json!({
        "fairness": fairness,
        "arms": bandit.arms(),
        "weights": weights,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn handle_strategies() -> anyhow::Result<()> {
    let mut listing = serde_json::Map::new();
    for id in StrategyId::ALL {
        let strategy = create_strategy(id, None)?;
        let schema = ParameterSchema::discover(strategy.as_ref());
        listing.insert(id.to_string(), serde_json::to_value(&schema)?);
    }
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn bandit(arms: usize, seed: Option<u64>) -> anyhow::Result<FairBandit> {
    let bandit = match seed {
        Some(seed) => FairBandit::seeded(arms, seed)?,
        None => FairBandit::new(arms)?,
    };
    Ok(bandit)
}
