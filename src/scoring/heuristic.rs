use serde::{Deserialize, Serialize};

use crate::{clamp_score, extract_caption_features, round1};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseRule {
    pub bonus: f64,
    pub phrases: Vec<String>,
}

impl Default for PhraseRule {
    fn default() -> Self {
        Self {
            bonus: 1.0,
            phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarityRules {
    pub base: f64,
    pub short_limit: usize,
    pub short_bonus: f64,
    pub question_bonus: f64,
}

impl Default for ClarityRules {
    fn default() -> Self {
        Self {
            base: 7.0,
            short_limit: 120,
            short_bonus: 1.0,
            question_bonus: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementRules {
    pub base: f64,
    pub emoji_bonus: f64,
    pub emoji_min_hits: usize,
    pub emoji_set: Vec<String>,
    pub cta: PhraseRule,
}

impl Default for EngagementRules {
    fn default() -> Self {
        Self {
            base: 6.0,
            emoji_bonus: 1.0,
            emoji_min_hits: 2,
            emoji_set: strings(&["🔥", "✨", "🚀", "😍", "💥", "🎯", "💡", "👇", "🙌", "⚡"]),
            cta: PhraseRule {
                bonus: 1.0,
                phrases: strings(&[
                    "comment below",
                    "tag a friend",
                    "share this",
                    "save this",
                    "link in bio",
                    "follow for more",
                    "let us know",
                    "double tap",
                ]),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRules {
    pub base: f64,
    pub commercial: PhraseRule,
    pub urgency: PhraseRule,
}

impl Default for ConversionRules {
    fn default() -> Self {
        Self {
            base: 6.0,
            commercial: PhraseRule {
                bonus: 1.0,
                phrases: strings(&[
                    "shop now",
                    "buy",
                    "order",
                    "discount",
                    "sale",
                    "free shipping",
                    "promo",
                    "off today",
                ]),
            },
            urgency: PhraseRule {
                bonus: 1.0,
                phrases: strings(&[
                    "limited time",
                    "last chance",
                    "today only",
                    "act fast",
                    "don't miss",
                    "ends soon",
                    "while stocks last",
                    "now or never",
                ]),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringRules {
    pub clarity: ClarityRules,
    pub engagement: EngagementRules,
    pub conversion: ConversionRules,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScore {
    pub clarity: f64,
    pub engagement: f64,
    pub conversion: f64,
    pub overall: f64,
}

impl ScoringRules {
    pub fn score(&self, caption: &str) -> HeuristicScore {
        let features = extract_caption_features(caption, self);

        let mut clarity = self.clarity.base;
        if features.char_count < self.clarity.short_limit {
            clarity += self.clarity.short_bonus;
        }
        if features.has_question {
            clarity += self.clarity.question_bonus;
        }

        let mut engagement = self.engagement.base;
        if features.emoji_hits >= self.engagement.emoji_min_hits {
            engagement += self.engagement.emoji_bonus;
        }
        if features.has_cta {
            engagement += self.engagement.cta.bonus;
        }

        let mut conversion = self.conversion.base;
        if features.has_commercial {
            conversion += self.conversion.commercial.bonus;
        }
        if features.has_urgency {
            conversion += self.conversion.urgency.bonus;
        }

        let clarity = clamp_score(clarity);
        let engagement = clamp_score(engagement);
        let conversion = clamp_score(conversion);
        let overall = round1((clarity + engagement + conversion) / 3.0);

        HeuristicScore {
            clarity,
            engagement,
            conversion,
            overall,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
