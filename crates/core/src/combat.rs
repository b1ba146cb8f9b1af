//! Battle outcome detection in narrator text.

use serde::{Deserialize, Serialize};

/// Score awarded for a won battle.
pub const WIN_SCORE: i32 = 10;
/// Score applied for a lost battle.
pub const LOSS_SCORE: i32 = -5;

const DEFEAT_PHRASES: &[&str] = &[
    "você foi derrotado",
    "você foi derrotada",
    "você perdeu a luta",
    "você perde a luta",
    "você perdeu o combate",
    "você cai inconsciente",
    "você desmaia",
    "derrota amarga",
];

const VICTORY_PHRASES: &[&str] = &[
    "inimigo foi derrotado",
    "inimigos foram derrotados",
    "você derrota",
    "você derrotou",
    "você vence",
    "você venceu",
    "cai derrotado",
    "caem derrotados",
    "vitória no combate",
    "vence a luta",
    "venceu a luta",
];

/// Outcome of a battle described in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Won,
    Lost,
}

impl CombatOutcome {
    /// Score delta applied to campaign progress.
    pub fn score_delta(self) -> i32 {
        match self {
            Self::Won => WIN_SCORE,
            Self::Lost => LOSS_SCORE,
        }
    }

    pub fn is_win(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// Look for a decisive battle outcome. Defeat phrases are checked first.
pub fn detect_combat_outcome(text: &str) -> Option<CombatOutcome> {
    let lower = text.to_lowercase();
    if DEFEAT_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(CombatOutcome::Lost);
    }
    if VICTORY_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(CombatOutcome::Won);
    }
    None
}
