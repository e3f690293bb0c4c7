//! Runtime defaults for the engine behind `regret`.
//!
//! Every value has a compile-time default and can be overridden through an
//! environment variable. Command-line flags take precedence over both.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use engine::EngineConfig;

const DEFAULT_ENGINE_DEPTH: u8 = 18;
const DEFAULT_SKILL_LEVEL: u8 = 20;
const DEFAULT_ENGINE_THREADS: u32 = 4;
const DEFAULT_ENGINE_HASH_MB: u32 = 512;
const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 30;

/// Parsed value of `var`, or `default` when unset or unparsable.
fn env_or<T: FromStr>(var: &str, default: T) -> T {
    parse_or(std::env::var(var).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Stockfish binary from `REGRET_STOCKFISH_PATH`. When unset the engine
/// searches the usual install locations.
pub fn get_stockfish_path() -> Option<PathBuf> {
    std::env::var_os("REGRET_STOCKFISH_PATH")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Search depth, `REGRET_ENGINE_DEPTH` or 18.
pub fn get_engine_depth() -> u8 {
    env_or("REGRET_ENGINE_DEPTH", DEFAULT_ENGINE_DEPTH)
}

/// Skill level, `REGRET_SKILL_LEVEL` or 20.
pub fn get_skill_level() -> u8 {
    env_or("REGRET_SKILL_LEVEL", DEFAULT_SKILL_LEVEL)
}

pub fn get_engine_threads() -> u32 {
    env_or("REGRET_ENGINE_THREADS", DEFAULT_ENGINE_THREADS)
}

pub fn get_engine_hash_mb() -> u32 {
    env_or("REGRET_ENGINE_HASH_MB", DEFAULT_ENGINE_HASH_MB)
}

/// Per-evaluation timeout, `REGRET_ENGINE_TIMEOUT_SECS` or 30 seconds.
pub fn get_engine_timeout() -> Duration {
    Duration::from_secs(env_or(
        "REGRET_ENGINE_TIMEOUT_SECS",
        DEFAULT_ENGINE_TIMEOUT_SECS,
    ))
}

/// Engine settings from the environment alone.
pub fn engine_config_from_env() -> EngineConfig {
    EngineConfig {
        stockfish_path: get_stockfish_path(),
        depth: get_engine_depth(),
        skill_level: Some(get_skill_level()),
        threads: Some(get_engine_threads()),
        hash_mb: Some(get_engine_hash_mb()),
        timeout: get_engine_timeout(),
    }
}
