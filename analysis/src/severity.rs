//! Severity as an ordered decision table.
//!
//! [`RULES`] is scanned top to bottom and the first rule whose guard holds
//! decides the verdict. A verdict of `None` means the move is not worth
//! reporting. Regret is in win-probability percentage points; scores are
//! centipawns from the analyzed player's side with mates pinned to
//! ±[`MATE_SCORE_CP`](crate::MATE_SCORE_CP).

use serde::{Deserialize, Serialize};

use crate::phase::GamePhase;
use crate::punishment::PunishmentSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blunder,
    Mistake,
    Inaccuracy,
}

/// Everything the classifier knows about one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveFacts {
    pub regret: f64,
    pub signal: PunishmentSignal,
    pub phase: GamePhase,
    pub pre_cp: i32,
    pub post_cp: i32,
}

impl MoveFacts {
    pub fn eval_swing(&self) -> i32 {
        self.pre_cp.saturating_sub(self.post_cp)
    }

    fn in_opening(&self) -> bool {
        self.phase == GamePhase::Opening
    }
}

/// One row of the decision table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub guard: fn(&MoveFacts) -> bool,
    pub verdict: Option<Severity>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("verdict", &self.verdict)
            .finish()
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "trivial_regret",
        guard: trivial_regret,
        verdict: None,
    },
    Rule {
        name: "opening_noise",
        guard: opening_noise,
        verdict: None,
    },
    Rule {
        name: "opening_imprecision",
        guard: opening_imprecision,
        verdict: Some(Severity::Inaccuracy),
    },
    Rule {
        name: "opening_obvious_punishment",
        guard: opening_obvious_punishment,
        verdict: Some(Severity::Blunder),
    },
    Rule {
        name: "opening_serious_error",
        guard: MoveFacts::in_opening,
        verdict: Some(Severity::Mistake),
    },
    Rule {
        name: "hung_piece_or_allowed_mate",
        guard: hung_piece_or_allowed_mate,
        verdict: Some(Severity::Blunder),
    },
    Rule {
        name: "catastrophic_regret",
        guard: catastrophic_regret,
        verdict: Some(Severity::Blunder),
    },
    Rule {
        name: "eval_collapse",
        guard: eval_collapse,
        verdict: Some(Severity::Blunder),
    },
    Rule {
        name: "winning_to_losing",
        guard: winning_to_losing,
        verdict: Some(Severity::Blunder),
    },
    Rule {
        name: "clear_worsening",
        guard: clear_worsening,
        verdict: Some(Severity::Mistake),
    },
    Rule {
        name: "forced_material_loss",
        guard: forced_material_loss,
        verdict: Some(Severity::Mistake),
    },
    Rule {
        name: "imprecision",
        guard: imprecision,
        verdict: Some(Severity::Inaccuracy),
    },
];

/// First rule that applies, or `None` when the move falls through the table.
pub fn matching_rule(facts: &MoveFacts) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.guard)(facts))
}

pub fn classify(facts: &MoveFacts) -> Option<Severity> {
    matching_rule(facts).and_then(|rule| rule.verdict)
}

fn trivial_regret(f: &MoveFacts) -> bool {
    f.regret < 2.0
}

fn opening_noise(f: &MoveFacts) -> bool {
    f.in_opening() && f.regret < 8.0
}

fn opening_imprecision(f: &MoveFacts) -> bool {
    f.in_opening() && f.regret < 15.0
}

fn opening_obvious_punishment(f: &MoveFacts) -> bool {
    f.in_opening() && f.signal.is_obvious
}

fn hung_piece_or_allowed_mate(f: &MoveFacts) -> bool {
    f.signal.is_obvious && (f.signal.hanging_piece || f.signal.mate_threat_in.is_some())
}

fn catastrophic_regret(f: &MoveFacts) -> bool {
    f.regret > 20.0
}

fn eval_collapse(f: &MoveFacts) -> bool {
    f.eval_swing() > 400
}

fn winning_to_losing(f: &MoveFacts) -> bool {
    f.pre_cp > 200 && f.post_cp < -100
}

fn clear_worsening(f: &MoveFacts) -> bool {
    f.regret > 7.0
        && f.regret <= 20.0
        && (f.eval_swing() > 150 || (f.pre_cp > 50 && f.post_cp < -50))
}

fn forced_material_loss(f: &MoveFacts) -> bool {
    f.regret > 5.0 && f.signal.forced_material_loss
}

fn imprecision(f: &MoveFacts) -> bool {
    f.regret > 3.0 && f.regret <= 7.0
}
