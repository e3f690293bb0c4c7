/// Slope of the logistic curve mapping centipawns to winning chances.
pub const WIN_PROBABILITY_SLOPE: f64 = 0.00368208;

/// Centipawn stand-in for a forced mate.
pub const MATE_SCORE_CP: i32 = 10_000;

/// Winning chances in percent (0..=100) for a centipawn advantage.
pub fn win_probability(cp: i32) -> f64 {
    100.0 / (1.0 + (-WIN_PROBABILITY_SLOPE * f64::from(cp)).exp())
}
