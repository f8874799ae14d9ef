pub mod config;
pub mod error;
pub mod generator;
pub mod performance;
pub mod planner;
pub mod scoring;
pub mod session;
pub mod week;

pub use config::{AppConfig, GeneratorConfig};
pub use error::{ForgeError, Result};
pub use generator::{CaptionGenerator, GenerationRequest, ModelScores, VariationCandidate};
pub use performance::{aggregate, PerformanceReport};
pub use planner::{ItemStatus, NewItem, Platform, PlannerItem, PlannerStore};
pub use scoring::{
    blend_overall, pick_recommended, score_batch, GenerationBatch, HeuristicScore, ScoredVariation,
    ScoringRules,
};
pub use session::{QuotaConfig, QuotaStatus, Session, Tier};
pub use week::{monday_of, week_days, week_view, DayPlan, WeekView};

use chrono::NaiveDate;

use crate::scoring::heuristic::PhraseRule;

#[derive(Debug, Clone)]
pub struct CaptionFeatures {
    pub char_count: usize,
    pub has_question: bool,
    pub emoji_hits: usize,
    pub has_cta: bool,
    pub has_commercial: bool,
    pub has_urgency: bool,
}

pub fn extract_caption_features(text: &str, rules: &ScoringRules) -> CaptionFeatures {
    let lowercase = text.to_lowercase();

    let mut emoji_hits = 0usize;
    for emoji in &rules.engagement.emoji_set {
        emoji_hits += text.matches(emoji.as_str()).count();
    }

    CaptionFeatures {
        char_count: text.chars().count(),
        has_question: text.contains('?'),
        emoji_hits,
        has_cta: phrase_hit(&lowercase, &rules.engagement.cta),
        has_commercial: phrase_hit(&lowercase, &rules.conversion.commercial),
        has_urgency: phrase_hit(&lowercase, &rules.conversion.urgency),
    }
}

fn phrase_hit(lowercase: &str, rule: &PhraseRule) -> bool {
    rule.phrases
        .iter()
        .any(|phrase| lowercase.contains(phrase.to_lowercase().as_str()))
}

pub fn normalize_hashtags<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .filter_map(|tag| {
            let stripped = tag.trim().trim_start_matches('#').trim();
            if stripped.is_empty() {
                None
            } else {
                Some(format!("#{}", stripped))
            }
        })
        .collect()
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(10.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
