//! Contextual action extraction.
//!
//! The narrator is asked to end every reply with a short list of options
//! introduced by a marker line such as `AÇÕES:`. This module splits that list
//! off the narrative text and classifies each option so the client can render
//! it as a button.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::progression::NarrativePhase;

/// Maximum number of actions returned to the client.
pub const MAX_ACTIONS: usize = 4;

/// Marker lines that introduce the action block (compared lowercased).
const ACTION_MARKERS: &[&str] = &["ações disponíveis:", "ações:", "acoes:", "actions:"];

/// Numbered (`1.`, `2)`) or bulleted (`-`, `*`, `•`) option lines.
static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[.)\-:]|[-*•])\s*(.+?)\s*$").expect("valid option regex")
});

/// Broad category of an action, used by the client for icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Combat,
    Explore,
    Dialogue,
    Stealth,
    Tech,
    Other,
}

// Checked in order; the first category with a matching keyword wins.
const KIND_KEYWORDS: &[(ActionKind, &[&str])] = &[
    (
        ActionKind::Combat,
        &["atac", "lutar", "luta", "combat", "golpe", "dispar", "atirar", "enfrentar", "duelo"],
    ),
    (
        ActionKind::Tech,
        &["hack", "terminal", "implante", "scanner", "escane", "decodific", "sistema", "drone"],
    ),
    (
        ActionKind::Stealth,
        &["esconder", "escond", "furtiv", "infiltr", "esgueir", "silêncio", "sombras"],
    ),
    (
        ActionKind::Dialogue,
        &["convers", "falar", "pergunt", "negoci", "interrog", "convenc", "persuad"],
    ),
    (
        ActionKind::Explore,
        &["explor", "investig", "examin", "procur", "vasculh", "observ", "seguir", "entrar", "fugir"],
    ),
];

/// One selectable option offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualAction {
    pub id: String,
    pub label: String,
    pub kind: ActionKind,
}

impl ContextualAction {
    fn new(index: usize, label: &str) -> Self {
        Self {
            id: format!("action_{}", index + 1),
            label: label.to_string(),
            kind: classify_action(label),
        }
    }
}

/// Result of splitting a narrator reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedActions {
    /// The reply with the action block removed.
    pub narrative: String,
    pub actions: Vec<ContextualAction>,
}

/// Classify an action label by keyword.
pub fn classify_action(label: &str) -> ActionKind {
    let lower = label.to_lowercase();
    KIND_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ActionKind::Other)
}

fn is_marker(line: &str) -> bool {
    let cleaned = line
        .trim()
        .trim_matches(|c: char| c == '*' || c == '#' || c == '_')
        .trim()
        .to_lowercase();
    ACTION_MARKERS.iter().any(|m| cleaned.starts_with(m))
}

fn clean_label(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '*' || c == '_' || c == '"')
        .trim()
        .to_string()
}

/// Split the action block off a narrator reply.
///
/// Without a marker line the text is returned untouched with no actions.
pub fn extract_actions(text: &str) -> ExtractedActions {
    let lines: Vec<&str> = text.lines().collect();
    let Some(marker) = lines.iter().position(|l| is_marker(l)) else {
        return ExtractedActions {
            narrative: text.trim().to_string(),
            actions: Vec::new(),
        };
    };

    let labels: Vec<String> = lines[marker + 1..]
        .iter()
        .filter_map(|line| OPTION_LINE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| clean_label(m.as_str())))
        .filter(|label| !label.is_empty())
        .take(MAX_ACTIONS)
        .collect();

    let actions = labels
        .iter()
        .enumerate()
        .map(|(i, label)| ContextualAction::new(i, label))
        .collect();

    ExtractedActions {
        narrative: lines[..marker].join("\n").trim().to_string(),
        actions,
    }
}

/// Fallback options when the model did not produce any.
pub fn default_actions(phase: NarrativePhase) -> Vec<ContextualAction> {
    let labels: [&str; MAX_ACTIONS] = match phase {
        NarrativePhase::Introduction | NarrativePhase::Exploration => [
            "Explorar o ambiente ao redor",
            "Conversar com alguém próximo",
            "Escanear a área com seus implantes",
            "Avançar escondido pelas sombras",
        ],
        NarrativePhase::Challenge | NarrativePhase::Climax => [
            "Atacar o inimigo mais próximo",
            "Hackear o sistema de segurança",
            "Negociar uma saída",
            "Procurar uma rota alternativa",
        ],
        NarrativePhase::Resolution => [
            "Examinar a recompensa",
            "Conversar com os aliados",
            "Investigar o que restou do local",
            "Seguir para o próximo capítulo",
        ],
    };
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| ContextualAction::new(i, label))
        .collect()
}
