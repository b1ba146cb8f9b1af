//! Chapter rewards: the catalog, item creation, and detection in narrator text.
//!
//! Detection is whole-word matching over the model's free-text reply. It only
//! looks for the reward of the current chapter, by its full name or one of its
//! aliases, next to an acquisition verb or a chapter-completion phrase.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Item type stored on every chapter reward.
pub const REWARD_ITEM_TYPE: &str = "reward";

/// Verbs that signal the character acquired something.
///
/// "segura" is left out: it is also the adjective "safe".
const ACQUISITION_VERBS: &[&str] = &[
    "obtém", "obteve", "recebe", "recebeu", "conquista", "conquistou", "adquire", "adquiriu",
    "pega", "pegou", "encontra", "encontrou", "consegue", "conseguiu", "alcança", "alcançou",
    "segurou", "toma", "tomou", "coleta", "coletou", "apanha", "apanhou", "captura",
    "capturou",
];

/// Phrases that signal the chapter is over.
const COMPLETION_PHRASES: &[&str] = &[
    "fim do capítulo",
    "capítulo concluído",
    "missão cumprida",
    "objetivo alcançado",
    "final do capítulo",
    "recompensa final",
    "vitória",
];

/// Case-insensitive alternation of `words`, each matched as a whole word.
fn whole_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Regex {
    let alternation = words
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid word list regex")
}

static ACQUISITION: LazyLock<Regex> =
    LazyLock::new(|| whole_words(ACQUISITION_VERBS.iter().copied()));

static COMPLETION: LazyLock<Regex> =
    LazyLock::new(|| whole_words(COMPLETION_PHRASES.iter().copied()));

/// Per chapter: the full reward name and the alias list.
static MENTIONS: LazyLock<Vec<(i32, Regex, Regex)>> = LazyLock::new(|| {
    CHAPTER_REWARDS
        .iter()
        .map(|(chapter, reward)| {
            (
                *chapter,
                whole_words([reward.name]),
                whole_words(reward.aliases.iter().copied()),
            )
        })
        .collect()
});

/// A reward definition from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReward {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub power: &'static str,
    pub rarity: &'static str,
    pub effect: &'static str,
    /// Other ways the narrator may refer to the reward.
    pub aliases: &'static [&'static str],
}

const CHAPTER_REWARDS: &[(i32, ChapterReward)] = &[
    (
        1,
        ChapterReward {
            slug: "cubo_sombras",
            name: "Cubo das Sombras",
            description: "Relíquia antiga pulsante com energia ancestral",
            power: "Manipulação de Sombras",
            rarity: "Lendário",
            effect: "+5 Energia, +3 Inteligência",
            aliases: &["relíquia perdida", "relíquia", "cubo das sombras", "cubo"],
        },
    ),
    (
        2,
        ChapterReward {
            slug: "cristal_arcano",
            name: "Cristal Arcano Puro",
            description: "Cristal instável com imenso poder arcano",
            power: "Energia Arcana",
            rarity: "Épico",
            effect: "+4 Inteligência, +2 Vida",
            aliases: &["cristal arcano", "cristal puro", "cristal", "fragmento arcano"],
        },
    ),
    (
        3,
        ChapterReward {
            slug: "cinturao_campeao",
            name: "Cinturão do Campeão",
            description: "Troféu conquistado no Coliseu de Neon",
            power: "Força Aprimorada",
            rarity: "Épico",
            effect: "+5 Força, +3 Vida",
            aliases: &["cinturão do campeão", "cinturão", "troféu", "prêmio"],
        },
    ),
];

/// Look up the catalog reward for a chapter.
pub fn chapter_reward(chapter: i32) -> Option<&'static ChapterReward> {
    CHAPTER_REWARDS
        .iter()
        .find(|(c, _)| *c == chapter)
        .map(|(_, reward)| reward)
}

/// A reward instance ready to be placed in a character's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: String,
    pub metadata: BTreeMap<String, String>,
    pub chapter: i32,
    pub campaign_id: String,
    pub obtained_at: Timestamp,
}

/// Build the inventory item granted for finishing `chapter` of `campaign_id`.
///
/// Chapters without a catalog entry get a generic treasure. The item id is the
/// catalog slug plus a short random suffix so repeated playthroughs do not collide.
pub fn create_reward_item(chapter: i32, campaign_id: &str, now: Timestamp) -> RewardItem {
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];

    match chapter_reward(chapter) {
        Some(reward) => {
            let metadata = BTreeMap::from([
                ("power".to_string(), reward.power.to_string()),
                ("rarity".to_string(), reward.rarity.to_string()),
                ("effect".to_string(), reward.effect.to_string()),
            ]);
            RewardItem {
                id: format!("{}_{suffix}", reward.slug),
                name: reward.name.to_string(),
                description: reward.description.to_string(),
                item_type: REWARD_ITEM_TYPE.to_string(),
                metadata,
                chapter,
                campaign_id: campaign_id.to_string(),
                obtained_at: now,
            }
        }
        None => RewardItem {
            id: format!("reward_chapter_{chapter}_{suffix}"),
            name: format!("Tesouro do Capítulo {chapter}"),
            description: format!("Recompensa obtida ao completar o capítulo {chapter}"),
            item_type: REWARD_ITEM_TYPE.to_string(),
            metadata: BTreeMap::from([("rarity".to_string(), "Raro".to_string())]),
            chapter,
            campaign_id: campaign_id.to_string(),
            obtained_at: now,
        },
    }
}

/// Which signals fired while scanning a reply. Exposed for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardSignals {
    pub acquisition: bool,
    pub reward_name: bool,
    pub alias: bool,
    pub completion: bool,
}

impl RewardSignals {
    /// The reward counts as delivered when it is mentioned together with an
    /// acquisition verb or a chapter-completion phrase.
    pub fn detected(&self) -> bool {
        (self.reward_name || self.alias) && (self.acquisition || self.completion)
    }
}

/// Scan `text` for signals that the chapter's reward was handed over.
pub fn reward_signals(text: &str, chapter: i32) -> RewardSignals {
    let Some((_, name, aliases)) = MENTIONS.iter().find(|(c, _, _)| *c == chapter) else {
        return RewardSignals::default();
    };

    RewardSignals {
        acquisition: ACQUISITION.is_match(text),
        reward_name: name.is_match(text),
        alias: aliases.is_match(text),
        completion: COMPLETION.is_match(text),
    }
}

/// Whether `text` delivers the reward of `chapter`.
pub fn detect_reward(text: &str, chapter: i32) -> bool {
    reward_signals(text, chapter).detected()
}
