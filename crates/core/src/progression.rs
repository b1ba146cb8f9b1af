//! Chapter progression state machine.
//!
//! A chapter moves through five narrative phases driven purely by the number
//! of player interactions. The narrator uses the phase to steer the model
//! (pacing guidance in the prompt) and to decide when a chapter reward may be
//! granted.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// First interaction count of each phase after `Introduction`.
pub const EXPLORATION_START: i32 = 3;
pub const CHALLENGE_START: i32 = 7;
pub const CLIMAX_START: i32 = 11;
pub const RESOLUTION_START: i32 = 14;

/// Interaction count at which the narrator must close the chapter.
pub const FORCED_CONCLUSION_AT: i32 = 18;

// ---------------------------------------------------------------------------
// NarrativePhase
// ---------------------------------------------------------------------------

/// Narrative phase of the chapter currently being played.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NarrativePhase {
    #[default]
    Introduction,
    Exploration,
    Challenge,
    Climax,
    Resolution,
}

impl NarrativePhase {
    /// Phase for a given number of completed interactions.
    pub fn for_interaction_count(count: i32) -> Self {
        match count {
            i32::MIN..EXPLORATION_START => Self::Introduction,
            EXPLORATION_START..CHALLENGE_START => Self::Exploration,
            CHALLENGE_START..CLIMAX_START => Self::Challenge,
            CLIMAX_START..RESOLUTION_START => Self::Climax,
            _ => Self::Resolution,
        }
    }

    /// Stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Exploration => "exploration",
            Self::Challenge => "challenge",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
        }
    }

    /// Parse a stored string value.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "introduction" => Some(Self::Introduction),
            "exploration" => Some(Self::Exploration),
            "challenge" => Some(Self::Challenge),
            "climax" => Some(Self::Climax),
            "resolution" => Some(Self::Resolution),
            _ => None,
        }
    }

    /// Pacing instruction injected into the system prompt.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Introduction => {
                "Fase: INTRODUÇÃO. Apresente o cenário, o clima e o objetivo do capítulo. \
                 Não entregue a recompensa ainda."
            }
            Self::Exploration => {
                "Fase: EXPLORAÇÃO. Revele pistas, locais e personagens secundários. \
                 Aumente o mistério aos poucos."
            }
            Self::Challenge => {
                "Fase: DESAFIO. Coloque obstáculos e inimigos no caminho do personagem. \
                 As escolhas devem ter consequências."
            }
            Self::Climax => {
                "Fase: CLÍMAX. Conduza ao confronto decisivo do capítulo. \
                 Se o personagem vencer, ele pode obter a recompensa."
            }
            Self::Resolution => {
                "Fase: RESOLUÇÃO. Conclua o capítulo e entregue a recompensa ao personagem \
                 de forma explícita."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ChapterProgression
// ---------------------------------------------------------------------------

/// Outcome of recording one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAdvance {
    pub interaction_count: i32,
    pub previous: NarrativePhase,
    pub current: NarrativePhase,
}

impl PhaseAdvance {
    /// Whether this interaction moved the chapter into a new phase.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Interaction counter for a single chapter of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChapterProgression {
    pub chapter: i32,
    pub interaction_count: i32,
}

impl ChapterProgression {
    /// A fresh chapter with no interactions.
    pub fn new(chapter: i32) -> Self {
        Self::resume(chapter, 0)
    }

    /// Resume a chapter from a stored counter. Negative counters are clamped to 0.
    pub fn resume(chapter: i32, interaction_count: i32) -> Self {
        Self {
            chapter,
            interaction_count: interaction_count.max(0),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> NarrativePhase {
        NarrativePhase::for_interaction_count(self.interaction_count)
    }

    /// Record one player interaction.
    pub fn advance(&mut self) -> PhaseAdvance {
        let previous = self.phase();
        self.interaction_count = self.interaction_count.saturating_add(1);
        PhaseAdvance {
            interaction_count: self.interaction_count,
            previous,
            current: self.phase(),
        }
    }

    /// The chapter reward may only be granted near the end of the chapter.
    pub fn reward_eligible(&self) -> bool {
        self.phase() >= NarrativePhase::Climax
    }

    /// The chapter has run long enough that the narrator must conclude it.
    pub fn must_conclude(&self) -> bool {
        self.interaction_count >= FORCED_CONCLUSION_AT
    }
}
