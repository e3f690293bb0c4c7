use crate::evaluator::{EngineEvaluation, EvaluationRequest, EvaluatorError, PositionEvaluator};
use crate::uci::{parse_uci_message, UciMessage};
use crate::{EngineCommand, EngineEvent};
use chess::{format_uci_move, AnalysisScore};
use cozy_chess::Move;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StockfishEngine {
    process: Child,
    command_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    config: EngineConfig,
    /// Set when a timed-out search could not be brought back in sync; the
    /// event stream may still carry its answer, so no further search runs.
    desynced: bool,
}

/// Configuration for engine strength and resources.
///
/// Every evaluation of one engine instance uses the same settings, so a
/// position always gets the same answer from it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Explicit binary; searched in the usual install locations when unset.
    pub stockfish_path: Option<PathBuf>,
    pub depth: u8,
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    /// Upper bound for a single evaluation.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stockfish_path: None,
            depth: 18,
            skill_level: Some(20),
            threads: Some(4),
            hash_mb: Some(512),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Stockfish not found")]
    NotFound,
    #[error("Failed to spawn Stockfish at {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Engine IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine has no {0}")]
    MissingPipe(&'static str),
    #[error("Engine closed before {0}")]
    Closed(&'static str),
    #[error("Timeout waiting for engine to respond")]
    HandshakeTimeout,
    #[error("Engine search timed out")]
    SearchTimeout,
    #[error("Engine finished without reporting a score")]
    MissingScore,
    #[error("Engine lost sync after a timed-out search")]
    Desynced,
}

impl From<EngineError> for EvaluatorError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SearchTimeout => EvaluatorError::Timeout,
            other => EvaluatorError::Unavailable(other.to_string()),
        }
    }
}

impl StockfishEngine {
    /// Spawn a new Stockfish instance and apply `config`.
    #[tracing::instrument(level = "info")]
    pub async fn spawn_with_config(config: EngineConfig) -> Result<Self, EngineError> {
        let path = match &config.stockfish_path {
            Some(path) => path.clone(),
            None => find_stockfish_path().ok_or(EngineError::NotFound)?,
        };
        tracing::info!("Found Stockfish at: {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                tracing::error!("Failed to spawn Stockfish: {}", source);
                EngineError::Spawn {
                    path: path.clone(),
                    source,
                }
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = process.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(64);
        tokio::spawn(read_engine_output(stdout, event_tx));
        let (command_tx, command_rx) = mpsc::channel::<EngineCommand>(32);
        tokio::spawn(write_engine_commands(stdin, command_rx));

        let mut engine = Self {
            process,
            command_tx,
            event_rx,
            config,
            desynced: false,
        };

        engine.send_command(EngineCommand::Uci).await?;
        engine.wait_for_ready("uciok").await?;

        for (name, value) in option_values(&engine.config) {
            tracing::info!(option = name, %value, "Setting engine option");
            engine
                .send_command(EngineCommand::SetOption {
                    name: name.to_string(),
                    value: Some(value),
                })
                .await?;
        }
        engine.sync().await?;

        tracing::info!("Stockfish engine spawned and initialized successfully");
        Ok(engine)
    }

    /// `isready` round trip. Everything the engine sent before `readyok`,
    /// including the answer to an abandoned search, is discarded.
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send_command(EngineCommand::IsReady).await?;
        self.wait_for_ready("readyok").await
    }

    async fn wait_for_ready(&mut self, what: &'static str) -> Result<(), EngineError> {
        let event_rx = &mut self.event_rx;
        let wait = async {
            while let Some(event) = event_rx.recv().await {
                if matches!(event, EngineEvent::Ready) {
                    tracing::debug!("Received {}", what);
                    return Ok(());
                }
            }
            Err(EngineError::Closed(what))
        };
        match tokio::time::timeout(HANDSHAKE_TIMEOUT, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Timeout waiting for {}", what);
                Err(EngineError::HandshakeTimeout)
            }
        }
    }

    /// Send a command to the engine
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn send_command(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        self.command_tx.send(cmd).await.map_err(|e| {
            tracing::error!("Failed to send command to queue: {}", e);
            EngineError::Closed("accepting commands")
        })
    }

    /// Search one position to the configured depth.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn analyse(&mut self, fen: &str) -> Result<EngineEvaluation, EngineError> {
        if self.desynced {
            return Err(EngineError::Desynced);
        }

        self.send_command(EngineCommand::SetPosition {
            fen: fen.to_string(),
        })
        .await?;
        self.send_command(EngineCommand::Go {
            depth: self.config.depth,
        })
        .await?;

        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.wait_for_bestmove()).await {
            Ok(Ok(search)) => {
                let score = search.score.ok_or(EngineError::MissingScore)?;
                let best_move = search.best_move.map(format_uci_move);
                tracing::debug!(
                    %fen,
                    %score,
                    depth = ?search.depth,
                    best_move = ?best_move,
                    "Position evaluated"
                );
                Ok(EngineEvaluation { score, best_move })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(%fen, ?timeout, "Engine search timed out, stopping");
                self.send_command(EngineCommand::Stop).await?;
                // The stopped search still answers with a bestmove; it has to
                // be behind us before the next position is searched.
                if let Err(e) = self.sync().await {
                    tracing::error!(error = %e, "Engine did not resync after stop");
                    self.desynced = true;
                }
                Err(EngineError::SearchTimeout)
            }
        }
    }

    /// Collect info lines until `bestmove`, keeping the last exact score of
    /// the main line.
    async fn wait_for_bestmove(&mut self) -> Result<SearchOutcome, EngineError> {
        let mut outcome = SearchOutcome::default();
        while let Some(event) = self.event_rx.recv().await {
            match event {
                EngineEvent::Info(info) => {
                    if info.multipv.unwrap_or(1) != 1 {
                        continue;
                    }
                    if let Some(depth) = info.depth {
                        outcome.depth = Some(depth);
                    }
                    match info.score {
                        Some(s) if !info.bound || outcome.score.is_none() => {
                            outcome.score = Some(s)
                        }
                        _ => {}
                    }
                }
                EngineEvent::BestMove(mv) => {
                    outcome.best_move = mv;
                    return Ok(outcome);
                }
                EngineEvent::Ready => {}
            }
        }
        Err(EngineError::Closed("sending bestmove"))
    }

    /// Shutdown the engine
    pub async fn shutdown(mut self) {
        let _ = self.send_command(EngineCommand::Quit).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), self.process.wait()).await;
        let _ = self.process.kill().await;
    }
}

#[derive(Debug, Default)]
struct SearchOutcome {
    best_move: Option<Move>,
    score: Option<AnalysisScore>,
    depth: Option<u8>,
}

impl PositionEvaluator for StockfishEngine {
    async fn evaluate(
        &mut self,
        request: &EvaluationRequest,
    ) -> Result<EngineEvaluation, EvaluatorError> {
        Ok(self.analyse(&request.fen).await?)
    }
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> Result<(), EngineError> {
    tracing::trace!("UCI >> {}", line);
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

/// `setoption` pairs for the configured strength and resources.
fn option_values(config: &EngineConfig) -> Vec<(&'static str, String)> {
    let mut options = Vec::new();
    if let Some(level) = config.skill_level {
        options.push(("Skill Level", level.min(20).to_string()));
    }
    if let Some(threads) = config.threads {
        options.push(("Threads", threads.clamp(1, 16).to_string()));
    }
    if let Some(hash_mb) = config.hash_mb {
        options.push(("Hash", hash_mb.clamp(1, 2048).to_string()));
    }
    options
}

/// Output reader task: engine stdout lines become events.
async fn read_engine_output(
    stdout: tokio::process::ChildStdout,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                tracing::warn!("Stockfish stdout EOF - engine closed");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                tracing::trace!("UCI << {}", trimmed);

                let event = match parse_uci_message(trimmed) {
                    Ok(UciMessage::UciOk) | Ok(UciMessage::ReadyOk) => EngineEvent::Ready,
                    Ok(UciMessage::BestMove { mv, .. }) => {
                        tracing::debug!("Received bestmove: {:?}", mv);
                        EngineEvent::BestMove(mv)
                    }
                    Ok(UciMessage::Info(info)) => EngineEvent::Info(info),
                    Ok(UciMessage::Id { name, value }) => {
                        tracing::info!(%name, %value, "Engine id");
                        continue;
                    }
                    Err(e) => {
                        tracing::trace!("Ignoring engine output: {}", e);
                        continue;
                    }
                };

                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Error reading from Stockfish stdout: {}", e);
                break;
            }
        }
    }
    tracing::debug!("Output reader task exiting");
}

/// Command processor task: engine commands become UCI lines on stdin.
async fn write_engine_commands(
    mut stdin: ChildStdin,
    mut command_rx: mpsc::Receiver<EngineCommand>,
) {
    while let Some(cmd) = command_rx.recv().await {
        let quit = matches!(cmd, EngineCommand::Quit);
        let line = format_command(&cmd);
        if let Err(e) = write_line(&mut stdin, &line).await {
            tracing::error!("Failed to write to stdin: {}", e);
            break;
        }
        if quit {
            break;
        }
    }
    tracing::debug!("Command processor task exiting");
}

fn format_command(cmd: &EngineCommand) -> String {
    match cmd {
        EngineCommand::Uci => "uci".to_string(),
        EngineCommand::SetPosition { fen } => format!("position fen {}", fen),
        EngineCommand::SetOption { name, value } => match value {
            Some(val) => format!("setoption name {} value {}", name, val),
            None => format!("setoption name {}", name),
        },
        EngineCommand::Go { depth } => format!("go depth {}", depth),
        EngineCommand::IsReady => "isready".to_string(),
        EngineCommand::Stop => "stop".to_string(),
        EngineCommand::Quit => "quit".to_string(),
    }
}

/// Find Stockfish executable in common locations
fn find_stockfish_path() -> Option<PathBuf> {
    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
        "stockfish", // In PATH
    ];

    paths
        .into_iter()
        .filter(|p| Path::new(p).exists() || *p == "stockfish")
        .find(|p| {
            // Try to verify it's actually runnable
            std::process::Command::new(p)
                .arg("--help")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok()
        })
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.depth, 18);
        assert_eq!(config.skill_level, Some(20));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.hash_mb, Some(512));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.stockfish_path.is_none());
    }

    #[test]
    fn test_format_commands() {
        assert_eq!(
            format_command(&EngineCommand::SetPosition {
                fen: chess::STARTING_FEN.to_string()
            }),
            format!("position fen {}", chess::STARTING_FEN)
        );
        assert_eq!(
            format_command(&EngineCommand::Go { depth: 18 }),
            "go depth 18"
        );
        assert_eq!(
            format_command(&EngineCommand::SetOption {
                name: "Hash".into(),
                value: Some("512".into())
            }),
            "setoption name Hash value 512"
        );
        assert_eq!(format_command(&EngineCommand::Stop), "stop");
        assert_eq!(format_command(&EngineCommand::Uci), "uci");
        assert_eq!(format_command(&EngineCommand::IsReady), "isready");
    }

    #[test]
    fn test_option_values_are_clamped() {
        let config = EngineConfig {
            skill_level: Some(40),
            threads: Some(0),
            hash_mb: None,
            ..Default::default()
        };
        assert_eq!(
            option_values(&config),
            vec![("Skill Level", "20".to_string()), ("Threads", "1".to_string())]
        );
    }

    #[test]
    fn test_engine_error_maps_to_evaluator_error() {
        assert_eq!(
            EvaluatorError::from(EngineError::SearchTimeout),
            EvaluatorError::Timeout
        );
        assert!(matches!(
            EvaluatorError::from(EngineError::NotFound),
            EvaluatorError::Unavailable(_)
        ));
        assert!(matches!(
            EvaluatorError::from(EngineError::Desynced),
            EvaluatorError::Unavailable(_)
        ));
    }

    /// A UCI engine that never finishes its first search on its own and
    /// answers `stop` with a move that does not belong to the next position.
    #[cfg(unix)]
    const STALLING_ENGINE: &str = r#"#!/bin/sh
searches=0
while read -r cmd rest; do
  case "$cmd" in
    uci) echo "id name Stallfish"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go)
      searches=$((searches + 1))
      if [ "$searches" -gt 1 ]; then
        echo "info depth 5 score cp 12 pv d2d4"
        echo "bestmove d2d4"
      fi ;;
    stop) echo "info depth 1 score cp 999"; echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stopped_search_does_not_answer_next_position() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("stallfish");
        std::fs::write(&script, STALLING_ENGINE).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = EngineConfig {
            stockfish_path: Some(script),
            depth: 5,
            timeout: Duration::from_millis(300),
            ..Default::default()
        };
        let mut engine = StockfishEngine::spawn_with_config(config).await.unwrap();

        let first = engine.analyse(chess::STARTING_FEN).await;
        assert!(matches!(first, Err(EngineError::SearchTimeout)));

        let next = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let second = engine.analyse(next).await.unwrap();
        assert_eq!(second.score, AnalysisScore::Centipawns(12));
        assert_eq!(second.best_move.as_deref(), Some("d2d4"));

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_spawn_with_missing_binary_fails() {
        let config = EngineConfig {
            stockfish_path: Some(PathBuf::from("/nonexistent/stockfish-binary")),
            ..Default::default()
        };
        let result = StockfishEngine::spawn_with_config(config).await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }
}
