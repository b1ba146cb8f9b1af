//! Seed data for the base campaigns.
//!
//! Base campaigns are global: every user sees the same three chapters and
//! their own progress is stored separately.

/// A reward shown on the campaign card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReward {
    pub reward_type: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Static definition of a base campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSeed {
    pub campaign_id: &'static str,
    pub title: &'static str,
    pub chapter: i32,
    pub description: &'static str,
    pub full_description: &'static str,
    pub image: &'static str,
    pub rewards: &'static [SeedReward],
}

impl CampaignSeed {
    /// Thumbnails reuse the card image.
    pub fn thumbnail(&self) -> &'static str {
        self.image
    }
}

const BASE_CAMPAIGNS: &[CampaignSeed] = &[
    CampaignSeed {
        campaign_id: "arena-sombras",
        title: "Capítulo 1 : O Cubo das Sombras",
        chapter: 1,
        description: "Nas profundezas de uma catedral em ruínas, o guerreiro sombrio encontra a Relíquia Perdida - um cubo pulsante de energia ancestral.",
        full_description: "Nas profundezas de uma catedral em ruínas, o guerreiro sombrio encontra a Relíquia Perdida - um cubo pulsante de energia ancestral. Para conquistá-lo, deve enfrentar as armadilhas ocultas que protegem seu poder e resistir à corrupção que emana da própria relíquia.",
        image: "./assets/images/campaign-thumb1.jpg",
        rewards: &[SeedReward {
            reward_type: "artifact",
            name: "Cubo das Sombras",
            icon: "cubo_sombras",
        }],
    },
    CampaignSeed {
        campaign_id: "laboratorio-cristais",
        title: "Capítulo 2 : Laboratório de Cristais Arcanos",
        chapter: 2,
        description: "Em um laboratório oculto nas profundezas da fortaleza inimiga, um cientista obcecado conduz experiências proibidas.",
        full_description: "Em um laboratório oculto nas profundezas da fortaleza inimiga, um cientista obcecado conduz experiências proibidas com fragmentos de energia arcana.",
        image: "./assets/images/campaign-thumb2.jpg",
        rewards: &[SeedReward {
            reward_type: "crystal",
            name: "Cristal Arcano Puro",
            icon: "cristal_arcano",
        }],
    },
    CampaignSeed {
        campaign_id: "coliseu-de-neon",
        title: "Capítulo 3 : Coliseu de Neon",
        chapter: 3,
        description: "No coração da cidade subterrânea, em um beco cercado por prédios decadentes.",
        full_description: "No coração da cidade subterrânea, em um beco cercado por prédios decadentes e iluminado apenas por letreiros de neon.",
        image: "./assets/images/campaign-image3.jpg",
        rewards: &[SeedReward {
            reward_type: "belt",
            name: "Cinturão do Campeão",
            icon: "cinturao_campeao",
        }],
    },
];

/// The base campaigns, ordered by chapter.
pub fn base_campaigns() -> &'static [CampaignSeed] {
    BASE_CAMPAIGNS
}

/// Find a base campaign by its slug.
pub fn find_seed(campaign_id: &str) -> Option<&'static CampaignSeed> {
    BASE_CAMPAIGNS.iter().find(|c| c.campaign_id == campaign_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::chapter_reward;

    #[test]
    fn campaigns_are_ordered_by_chapter() {
        let chapters: Vec<i32> = base_campaigns().iter().map(|c| c.chapter).collect();
        assert_eq!(chapters, [1, 2, 3]);
    }

    #[test]
    fn card_rewards_match_the_reward_catalog() {
        for seed in base_campaigns() {
            let reward = chapter_reward(seed.chapter).unwrap();
            assert_eq!(seed.rewards[0].name, reward.name);
            assert_eq!(seed.rewards[0].icon, reward.slug);
        }
    }

    #[test]
    fn find_by_slug() {
        assert_eq!(find_seed("coliseu-de-neon").unwrap().chapter, 3);
        assert!(find_seed("unknown").is_none());
    }
}
