use anyhow::{Context, Result};
use clap::Parser;
use forage_core::config::{BoundaryPolicy, SimConfig};
use forage_core::Simulation;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forage-sim")]
#[command(version)]
#[command(about = "Grid foraging simulation with genome-weighted selection")]
struct Cli {
    /// JSON config file; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the maximum number of rounds
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Override the starting population
    #[arg(short, long)]
    population: Option<usize>,

    /// Clamp movement at grid edges instead of wrapping
    #[arg(long)]
    clamp: bool,

    /// Keep uneaten food between rounds
    #[arg(long)]
    persistent_food: bool,

    /// Write the run summary as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(rounds) = cli.rounds {
        config.max_rounds = rounds;
    }
    if let Some(population) = cli.population {
        config.starting_population = population;
    }
    if cli.clamp {
        config.boundary = BoundaryPolicy::Clamp;
    }
    if cli.persistent_food {
        config.clear_food_each_day = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut sim = Simulation::try_new(config)?;
    while let Some(record) = sim.step_round() {
        info!(
            round = record.round,
            population = record.population,
            deaths = record.deaths,
            births = record.births,
            hawks = record.population_by_kind.hawks,
            doves = record.population_by_kind.doves,
            "round"
        );
    }
    let summary = sim.summary();
    info!(
        total_deaths = summary.total_deaths,
        total_births = summary.total_births,
        rounds_completed = summary.rounds_completed,
        final_population = summary.final_population,
        "done"
    );

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}
