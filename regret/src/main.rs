//! `regret`: review one player's moves in a PGN and print what they should
//! regret as JSON.
//!
//! Logs go to stderr (filter with `RUST_LOG`), so stdout only ever carries the
//! report. Engine defaults come from the environment, see [`config`].

use std::path::{Path, PathBuf};

use analysis::{Analyzer, GameAnalysisResult};
use anyhow::Context;
use clap::Parser;
use engine::{EngineConfig, StockfishEngine};

mod config;

#[derive(Parser, Debug)]
#[command(name = "regret", about = "Find the moves a human would regret")]
struct Cli {
    /// Player whose moves are reviewed, matched case-insensitively.
    #[arg(short, long)]
    username: String,

    /// Game record to analyze.
    #[arg(long, default_value = "moves.pgn")]
    pgn_file: PathBuf,

    /// Stockfish binary, overriding `REGRET_STOCKFISH_PATH`.
    #[arg(long)]
    stockfish: Option<PathBuf>,

    /// Search depth per position.
    #[arg(long)]
    depth: Option<u8>,

    /// Stockfish skill level (0-20).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=20))]
    skill_level: Option<u8>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let mut config = config::engine_config_from_env();
        if let Some(path) = &self.stockfish {
            config.stockfish_path = Some(path.clone());
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(skill) = self.skill_level {
            config.skill_level = Some(skill);
        }
        config
    }
}

fn read_pgn(path: &Path) -> anyhow::Result<String> {
    let pgn = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read game record {}", path.display()))?;
    if pgn.trim().is_empty() {
        anyhow::bail!("game record {} is empty", path.display());
    }
    Ok(pgn)
}

fn render(result: &GameAnalysisResult, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pgn = read_pgn(&cli.pgn_file)?;

    let config = cli.engine_config();
    tracing::info!(depth = config.depth, skill = ?config.skill_level, "Starting engine");
    let engine = StockfishEngine::spawn_with_config(config)
        .await
        .context("failed to start Stockfish")?;

    let mut analyzer = Analyzer::new(engine);
    let outcome = analyzer.analyze(&pgn, &cli.username).await;
    analyzer.into_evaluator().shutdown().await;

    let result = outcome.with_context(|| format!("failed to analyze {}", cli.pgn_file.display()))?;
    println!("{}", render(&result, cli.pretty)?);
    Ok(())
}
