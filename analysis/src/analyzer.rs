use std::sync::Arc;

use chess::{format_san, PgnMove};
use cozy_chess::Color;
use engine::PositionEvaluator;

use crate::cache::EvaluationCache;
use crate::error::AnalysisError;
use crate::helpers::resolve_engine_move;
use crate::phase::classify_phase;
use crate::punishment::detect_punishment;
use crate::punishment_line::punishment_line;
use crate::record::{parse_record, resolve_player, GameSummary};
use crate::severity::{classify, MoveFacts, Severity};
use crate::types::{GameAnalysisResult, ProblemRecord};

/// Reviews games for one evaluator.
///
/// Each analysis walks the game once. Evaluations go through the cache, which
/// can be shared with other analyzers via [`Analyzer::with_shared_cache`].
pub struct Analyzer<E> {
    evaluator: E,
    cache: Arc<EvaluationCache>,
}

impl<E: PositionEvaluator> Analyzer<E> {
    pub fn new(evaluator: E) -> Self {
        Self::with_shared_cache(evaluator, Arc::new(EvaluationCache::new()))
    }

    pub fn with_shared_cache(evaluator: E, cache: Arc<EvaluationCache>) -> Self {
        Self { evaluator, cache }
    }

    pub fn cache(&self) -> &Arc<EvaluationCache> {
        &self.cache
    }

    pub fn into_evaluator(self) -> E {
        self.evaluator
    }

    /// Review every move `username` played in `pgn`.
    ///
    /// The record and the player are validated before any evaluation. Any
    /// evaluator failure aborts the whole analysis.
    #[tracing::instrument(level = "info", skip(self, pgn))]
    pub async fn analyze(
        &mut self,
        pgn: &str,
        username: &str,
    ) -> Result<GameAnalysisResult, AnalysisError> {
        let game = parse_record(pgn)?;
        let player = resolve_player(&game, username)?;
        tracing::info!(plies = game.moves.len(), ?player, "Analyzing game");

        let mut problems = Vec::new();
        for (index, ply) in game.moves.iter().enumerate() {
            if ply.before.side_to_move() != player {
                continue;
            }
            if let Some(problem) = self.review_move(ply, player).await? {
                tracing::debug!(
                    ply = index + 1,
                    san = %problem.played,
                    severity = ?problem.severity,
                    regret = problem.regret,
                    "Problem found"
                );
                problems.push(problem);
            }
        }

        let result = GameAnalysisResult::new(GameSummary::from_game(&game, player), problems);
        tracing::info!(
            total = result.total_problems,
            blunders = result.blunders,
            mistakes = result.mistakes,
            inaccuracies = result.inaccuracies,
            cache_hits = self.cache.hits(),
            cache_misses = self.cache.misses(),
            "Analysis complete"
        );
        Ok(result)
    }

    /// Score one player move, returning a record only when it is worth regret.
    async fn review_move(
        &mut self,
        ply: &PgnMove,
        player: Color,
    ) -> Result<Option<ProblemRecord>, AnalysisError> {
        let move_number = u32::from(ply.before.fullmove_number());

        let pre = self.cache.evaluate(&mut self.evaluator, &ply.before).await?;
        let best = pre
            .best_move
            .as_deref()
            .and_then(|uci| resolve_engine_move(&ply.before, uci));
        if best == Some(ply.mv) {
            tracing::trace!(move_number, san = %ply.san, "Best move played");
            return Ok(None);
        }

        let post = self.cache.evaluate(&mut self.evaluator, &ply.after).await?;
        let pre_view = pre.for_player(ply.before.side_to_move(), player);
        let post_view = post.for_player(ply.after.side_to_move(), player);
        let regret = pre_view.win_probability - post_view.win_probability;

        let signal = detect_punishment(&ply.after, player, post.score);
        let phase = classify_phase(move_number, &ply.after);
        let facts = MoveFacts {
            regret,
            signal,
            phase,
            pre_cp: pre_view.cp,
            post_cp: post_view.cp,
        };

        let Some(severity) = classify(&facts) else {
            return Ok(None);
        };

        let line = match severity {
            Severity::Blunder | Severity::Mistake => {
                punishment_line(&self.cache, &mut self.evaluator, &ply.after).await
            }
            Severity::Inaccuracy => None,
        };

        Ok(Some(ProblemRecord {
            move_number,
            played: ply.san.clone(),
            best_move: best.map(|mv| format_san(&ply.before, mv)),
            severity,
            regret: (regret * 10.0).round() / 10.0,
            eval_before: pre_view.format(),
            eval_after: post_view.format(),
            hanging_piece: signal.hanging_piece,
            mate_threat: signal.mate_threat_in,
            forced_loss: signal.forced_material_loss,
            punishment_line: line,
            game_phase: phase,
        }))
    }
}
