//! Static world lore of the Chromance setting.
//!
//! When a chapter is finished its lore facts are written into the permanent
//! `world_lore` memory so later chapters can retrieve them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifier of the only world currently shipped.
pub const WORLD_ID: &str = "chromance";

/// Category of a lore fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoreType {
    Location,
    Artifact,
    Enemy,
    Npc,
    Faction,
    WorldRule,
}

impl LoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Artifact => "artifact",
            Self::Enemy => "enemy",
            Self::Npc => "npc",
            Self::Faction => "faction",
            Self::WorldRule => "world_rule",
        }
    }
}

/// One piece of world knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct LoreFact {
    pub lore_type: LoreType,
    pub text: &'static str,
    pub importance: f64,
    /// Extra descriptive tags, e.g. `("danger_level", "high")`.
    pub tags: &'static [(&'static str, &'static str)],
}

const CHAPTER_ONE: &[LoreFact] = &[
    LoreFact {
        lore_type: LoreType::Location,
        text: "Catedral em ruínas nas profundezas da cidade - estrutura gótica antiga com armadilhas mágicas e energias corrompidas.",
        importance: 0.9,
        tags: &[("danger_level", "high")],
    },
    LoreFact {
        lore_type: LoreType::Artifact,
        text: "Cubo das Sombras - relíquia ancestral pulsante de energia arcana, emite corrupção e possui grande poder místico.",
        importance: 1.0,
        tags: &[("power_level", "legendary")],
    },
    LoreFact {
        lore_type: LoreType::Enemy,
        text: "Guardas Sombrios - entidades que protegem relíquias ancestrais nas ruínas, vulneráveis a luz mas resistentes a ataques físicos.",
        importance: 0.7,
        tags: &[("threat_level", "medium")],
    },
];

const CHAPTER_TWO: &[LoreFact] = &[
    LoreFact {
        lore_type: LoreType::Location,
        text: "Laboratório de Cristais Arcanos - instalação oculta na fortaleza com experimentos proibidos de energia arcana.",
        importance: 0.9,
        tags: &[("danger_level", "very_high")],
    },
    LoreFact {
        lore_type: LoreType::Artifact,
        text: "Cristal Arcano Puro - fragmento de energia arcana cristalizada usado em experimentos perigosos.",
        importance: 1.0,
        tags: &[("power_level", "legendary")],
    },
    LoreFact {
        lore_type: LoreType::Npc,
        text: "Cientista Obcecado - pesquisador que conduz experimentos proibidos com energia arcana no laboratório.",
        importance: 0.8,
        tags: &[("alignment", "hostile")],
    },
];

const CHAPTER_THREE: &[LoreFact] = &[
    LoreFact {
        lore_type: LoreType::Location,
        text: "Coliseu de Neon - arena de combate underground no coração da cidade subterrânea, iluminada por letreiros de neon.",
        importance: 0.9,
        tags: &[("danger_level", "high")],
    },
    LoreFact {
        lore_type: LoreType::Artifact,
        text: "Cinturão do Campeão - prêmio dado aos vencedores do coliseu, símbolo de prestígio nas ruas.",
        importance: 1.0,
        tags: &[("power_level", "rare")],
    },
    LoreFact {
        lore_type: LoreType::Faction,
        text: "Gangues do Coliseu - organizações criminosas que controlam apostas e combates ilegais na cidade subterrânea.",
        importance: 0.7,
        tags: &[("alignment", "neutral")],
    },
];

/// Foundational rules, recorded together with the first chapter.
const WORLD_RULES: &[LoreFact] = &[
    LoreFact {
        lore_type: LoreType::WorldRule,
        text: "Chromance - universo cyberpunk onde corporações controlam tudo, tecnologia se mistura com magia arcana.",
        importance: 1.0,
        tags: &[("category", "world_foundation")],
    },
    LoreFact {
        lore_type: LoreType::WorldRule,
        text: "Energia Arcana - força mística presente em ruínas antigas, pode corromper quem a utiliza sem proteção adequada.",
        importance: 0.8,
        tags: &[("category", "magic_system")],
    },
    LoreFact {
        lore_type: LoreType::WorldRule,
        text: "Cidade Subterrânea - megacidade cyberpunk dividida em níveis, quanto mais profundo mais perigoso e antigo.",
        importance: 0.9,
        tags: &[("category", "world_geography")],
    },
];

/// Lore revealed by finishing `chapter`.
pub fn chapter_lore(chapter: i32) -> Vec<&'static LoreFact> {
    let facts: &[LoreFact] = match chapter {
        1 => CHAPTER_ONE,
        2 => CHAPTER_TWO,
        3 => CHAPTER_THREE,
        _ => &[],
    };
    let rules: &[LoreFact] = if chapter == 1 { WORLD_RULES } else { &[] };
    facts.iter().chain(rules).collect()
}

/// Deterministic id of a lore fact, so the same fact is only stored once.
pub fn lore_id(text: &str, lore_type: LoreType, chapter: i32) -> String {
    let prefix: String = text.chars().take(50).collect();
    let digest = Sha256::digest(format!("lore_{}_{chapter}_{prefix}", lore_type.as_str()));
    digest
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect()
}
