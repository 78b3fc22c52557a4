//! Fantasy Sim CLI
//!
//! Slate simulation from roster JSON, tennis match batches from rate-stat CSV.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use fantasy_core::tennis::{EloComparison, MatchDistribution};
#[cfg(feature = "cli")]
use fantasy_core::{SimConfig, SimulationRunner, Summarizer, Summary, Surface, TennisConfig};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "fantasy-sim")]
#[command(about = "Monte Carlo fantasy outcome simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Simulate a slate of teams
    Slate {
        /// Roster JSON file ({"teams": [...]} or a list of teams)
        #[arg(long)]
        roster: PathBuf,

        /// Config file (.json/.yaml); falls back to FANTASY_SIM_CONFIG_PATH
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trials (overrides config)
        #[arg(long)]
        simulations: Option<usize>,

        /// Run trials on the rayon pool
        #[arg(long, default_value = "false")]
        parallel: bool,

        /// Entity pair to correlate, as "A,B" (repeatable)
        #[arg(long = "pair")]
        pairs: Vec<String>,

        /// Output summary JSON file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output percentile CSV file
        #[arg(long)]
        percentiles: Option<PathBuf>,
    },

    /// Simulate repeated matches between two players
    Tennis {
        /// Rate-stat CSV file
        #[arg(long)]
        stats: PathBuf,

        #[arg(long)]
        player1: String,

        #[arg(long)]
        player2: String,

        /// hard, clay, grass or all
        #[arg(long, default_value = "all")]
        surface: String,

        /// 3 or 5
        #[arg(long, default_value = "3")]
        best_of: u8,

        #[arg(long, default_value = "1000")]
        matches: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "false")]
        parallel: bool,

        /// Surface Elo ratings for an edge comparison, as "P1,P2"
        #[arg(long)]
        elo: Option<String>,

        /// Output distribution JSON file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Simulate every pairing in a player1,player2,surface CSV
    Matchups {
        #[arg(long)]
        stats: PathBuf,

        #[arg(long)]
        matchups: PathBuf,

        #[arg(long, default_value = "3")]
        best_of: u8,

        #[arg(long, default_value = "1000")]
        matches: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Output JSON file with one distribution per successful pairing
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Slate { roster, config, seed, simulations, parallel, pairs, out, percentiles } => {
            let mut config = match config {
                Some(path) => SimConfig::load(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => SimConfig::from_env().context("Failed to load config from environment")?,
            };
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(n) = simulations {
                config.num_simulations = n;
            }
            config.parallel |= parallel;
            config.validate()?;

            let pairs = parse_pairs(&pairs)?;
            let roster = fantasy_cli::load_roster(&roster, &config)?;
            let output = SimulationRunner::new(config)?.run(&roster)?;
            let summary = Summarizer::summarize_output(&output, &roster, &pairs);

            print_summary(&summary, output.seed);

            if let Some(path) = out {
                fantasy_cli::write_json(&path, &summary)?;
                println!("Summary saved to: {}", path.display());
            }
            if let Some(path) = percentiles {
                fantasy_cli::write_percentiles_csv(&path, &summary)?;
                println!("Percentiles saved to: {}", path.display());
            }
        }

        Commands::Tennis {
            stats,
            player1,
            player2,
            surface,
            best_of,
            matches,
            seed,
            parallel,
            elo,
            out,
        } => {
            let surface: Surface = surface.parse()?;
            let table = fantasy_cli::load_player_stats_csv(&stats)?;
            let config = TennisConfig { best_of, num_matches: matches, seed, parallel, ..Default::default() };
            let batch = fantasy_core::MatchBatch::from_table(&table, &player1, &player2, surface, config)?;
            let distribution = batch.run()?;

            print_distribution(&distribution);
            if let Some(ratings) = elo {
                let (p1, p2) = parse_elo(&ratings)?;
                let cmp = EloComparison::new(&distribution, p1, p2);
                println!(
                    "   Elo:        {:.1}% (edge {:+.1}%)",
                    cmp.elo * 100.0,
                    cmp.edge * 100.0
                );
            }

            if let Some(path) = out {
                fantasy_cli::write_json(&path, &distribution)?;
                println!("Distribution saved to: {}", path.display());
            }
        }

        Commands::Matchups { stats, matchups, best_of, matches, seed, out } => {
            let table = fantasy_cli::load_player_stats_csv(&stats)?;
            let matchups = fantasy_cli::load_matchups_csv(&matchups)?;
            let config = TennisConfig { best_of, num_matches: matches, seed, ..Default::default() };
            config.validate()?;

            let mut finished = Vec::new();
            for (matchup, outcome) in fantasy_core::run_matchups(&table, &matchups, &config) {
                match outcome {
                    Ok(distribution) => {
                        print_distribution(&distribution);
                        finished.push(distribution);
                    }
                    Err(e) if e.is_recoverable() => {
                        println!("Skipped {} vs {}: {e}", matchup.player1, matchup.player2);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            println!("\n{} of {} pairings simulated", finished.len(), matchups.len());

            if let Some(path) = out {
                fantasy_cli::write_json(&path, &finished)?;
                println!("Distributions saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[cfg(feature = "cli")]
fn parse_pairs(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            let (a, b) = pair
                .split_once(',')
                .with_context(|| format!("Pair must be \"A,B\", got \"{pair}\""))?;
            Ok((a.trim().to_string(), b.trim().to_string()))
        })
        .collect()
}

#[cfg(feature = "cli")]
fn parse_elo(raw: &str) -> Result<(f64, f64)> {
    let (a, b) = raw
        .split_once(',')
        .with_context(|| format!("Elo must be \"P1,P2\", got \"{raw}\""))?;
    let p1 = a.trim().parse().with_context(|| format!("Bad Elo rating: {a}"))?;
    let p2 = b.trim().parse().with_context(|| format!("Bad Elo rating: {b}"))?;
    Ok((p1, p2))
}

#[cfg(feature = "cli")]
fn print_summary(summary: &Summary, seed: u64) {
    if summary.is_empty() {
        println!("\nNo data: nothing to summarize");
        return;
    }
    println!("\nSlate simulated ({} trials, seed {seed})", summary.total_trials);
    for (team, outcome) in &summary.groups {
        println!(
            "   {team:<16} mean {:>6.2}  p50 {:>6.2}  p95 {:>6.2}",
            outcome.mean, outcome.percentiles.p50, outcome.percentiles.p95
        );
    }
    for pair in &summary.correlations {
        match pair.correlation {
            Some(r) => println!("   corr({}, {}) = {r:.3}", pair.entity_a, pair.entity_b),
            None => println!("   corr({}, {}) = n/a", pair.entity_a, pair.entity_b),
        }
    }
    if !summary.insufficient_data.is_empty() {
        println!("   Insufficient data: {}", summary.insufficient_data.join(", "));
    }
}

#[cfg(feature = "cli")]
fn print_distribution(dist: &MatchDistribution) {
    println!("\n{} vs {} ({} matches, seed {})", dist.player1, dist.player2, dist.matches, dist.seed);
    println!(
        "   Win:        {:.1}% / {:.1}%",
        dist.player1_win_probability * 100.0,
        dist.player2_win_probability * 100.0
    );
    if let (Some(a), Some(b)) = (&dist.player1_points, &dist.player2_points) {
        println!("   Fantasy:    {:.2} / {:.2} (mean)", a.mean, b.mean);
    }
    println!(
        "   Sets {:.2}  Games {:.1}  Tiebreaks {:.2}  Straight sets {:.1}%",
        dist.mean_sets,
        dist.mean_games,
        dist.tiebreak_rate,
        dist.straight_sets_rate * 100.0
    );
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("fantasy-sim CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
