//! Prompt templating for the game master persona.

use std::fmt::Write as _;

use crate::progression::NarrativePhase;
use crate::validation::Attributes;

/// Number of past conversation messages forwarded to the model.
pub const HISTORY_WINDOW: usize = 6;

/// Maximum number of retrieved memories included in the prompt.
pub const MAX_PROMPT_MEMORIES: usize = 5;

const WORLD_PRIMER: &str = "Você é um Mestre de RPG no universo Chromance, um mundo cyberpunk.

Mundo:
- Corporações controlam tudo
- Hackers e netrunners
- Tecnologia + magia
- Neon e atmosfera dark

Seu papel:
- Seja criativo e envolvente
- Mantenha tom cyberpunk
- Responda em português
- Máximo 150 palavras
- Crie situações interessantes";

const ACTIONS_INSTRUCTION: &str = "Termine SEMPRE a resposta com a linha \"AÇÕES:\" seguida de \
exatamente 4 opções numeradas (1. a 4.), curtas, que o personagem pode escolher a seguir.";

/// Character sheet summary used in the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterContext {
    pub name: String,
    pub race: String,
    pub class: String,
    pub description: Option<String>,
    pub level: i32,
    pub attributes: Option<Attributes>,
}

/// State of the chapter being played.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignContext {
    pub title: String,
    pub chapter: i32,
    pub phase: NarrativePhase,
    pub interaction_count: i32,
    pub reward_name: Option<String>,
    pub reward_eligible: bool,
    pub must_conclude: bool,
}

/// Everything the system prompt can mention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    pub character: Option<CharacterContext>,
    pub campaign: Option<CampaignContext>,
    /// Retrieved memories, best match first.
    pub memories: Vec<String>,
    pub generate_actions: bool,
}

/// Build the system message for a chat turn.
pub fn build_system_prompt(ctx: &PromptContext) -> String {
    let mut prompt = String::from(WORLD_PRIMER);

    if let Some(character) = &ctx.character {
        let _ = write!(
            prompt,
            "\n\nPersonagem:\n- Nome: {}\n- Raça: {}\n- Classe: {}\n- Nível: {}",
            character.name, character.race, character.class, character.level
        );
        if let Some(description) = character.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(prompt, "\n- Descrição: {description}");
        }
        if let Some(a) = &character.attributes {
            let _ = write!(
                prompt,
                "\n- Atributos: Força {}, Destreza {}, Inteligência {}, Carisma {}",
                a.strength, a.dexterity, a.intelligence, a.charisma
            );
        }
        prompt.push_str("\n\nUse essas informações.");
    }

    if let Some(campaign) = &ctx.campaign {
        let _ = write!(
            prompt,
            "\n\nCampanha: {} (capítulo {}, interação {})\n{}",
            campaign.title,
            campaign.chapter,
            campaign.interaction_count,
            campaign.phase.guidance()
        );
        if let Some(reward) = &campaign.reward_name {
            if campaign.reward_eligible {
                let _ = write!(
                    prompt,
                    "\nA recompensa do capítulo é \"{reward}\". Se o personagem a conquistar, \
                     diga claramente que ele obtém {reward}."
                );
            } else {
                let _ = write!(
                    prompt,
                    "\nA recompensa do capítulo é \"{reward}\", mas ainda não pode ser entregue."
                );
            }
        }
        if campaign.must_conclude {
            prompt.push_str(
                "\nO capítulo já se estendeu demais: conclua-o nesta resposta com \"Fim do capítulo\".",
            );
        }
    }

    if !ctx.memories.is_empty() {
        prompt.push_str("\n\nMemórias relevantes da história:");
        for memory in ctx.memories.iter().take(MAX_PROMPT_MEMORIES) {
            let _ = write!(prompt, "\n- {}", memory.trim());
        }
    }

    if ctx.generate_actions {
        prompt.push_str("\n\n");
        prompt.push_str(ACTIONS_INSTRUCTION);
    }

    prompt
}

/// Prompt asking the model to improve a partially filled character.
pub fn build_character_suggestion_prompt(partial: &serde_json::Value) -> String {
    format!(
        "Baseado nos dados: {partial}\n\nSugira melhorias para um personagem cyberpunk de \
         Chromance. Seja criativo mas coerente."
    )
}

/// The most recent `HISTORY_WINDOW` entries of a conversation.
pub fn history_window<T>(history: &[T]) -> &[T] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}
