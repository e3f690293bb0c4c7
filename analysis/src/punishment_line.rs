use chess::format_san;
use cozy_chess::Board;
use engine::PositionEvaluator;
use smallvec::SmallVec;

use crate::cache::EvaluationCache;
use crate::helpers::resolve_engine_move;

/// Plies of best play shown after a blunder or mistake.
pub const PUNISHMENT_LINE_PLIES: usize = 4;

/// Best continuation from `after`, in SAN separated by spaces.
///
/// Display-only: an evaluator failure is logged and yields `None` instead of
/// failing the analysis, and so does a line with no moves.
pub async fn punishment_line<E: PositionEvaluator>(
    cache: &EvaluationCache,
    evaluator: &mut E,
    after: &Board,
) -> Option<String> {
    let mut board = after.clone();
    let mut line: SmallVec<[String; PUNISHMENT_LINE_PLIES]> = SmallVec::new();

    while line.len() < PUNISHMENT_LINE_PLIES {
        let evaluation = match cache.evaluate(evaluator, &board).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                tracing::warn!(error = %e, fen = %board, "Punishment line unavailable");
                return None;
            }
        };
        let Some(mv) = evaluation
            .best_move
            .as_deref()
            .and_then(|uci| resolve_engine_move(&board, uci))
        else {
            break;
        };
        line.push(format_san(&board, mv));
        board.play_unchecked(mv);
    }

    if line.is_empty() {
        None
    } else {
        Some(line.join(" "))
    }
}
