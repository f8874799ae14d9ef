pub mod heuristic;
pub mod picker;

pub use heuristic::{
    ClarityRules, ConversionRules, EngagementRules, HeuristicScore, PhraseRule, ScoringRules,
};
pub use picker::pick_recommended;

use serde::Serialize;

use crate::generator::VariationCandidate;
use crate::round1;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredVariation {
    pub candidate: VariationCandidate,
    pub heuristic: HeuristicScore,
    pub combined: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationBatch {
    pub variations: Vec<ScoredVariation>,
    pub recommended: Option<usize>,
}

pub fn blend_overall(heuristic_overall: f64, model_overall: f64) -> f64 {
    round1((heuristic_overall + model_overall) / 2.0)
}

pub fn score_batch(candidates: Vec<VariationCandidate>, rules: &ScoringRules) -> GenerationBatch {
    let variations: Vec<ScoredVariation> = candidates
        .into_iter()
        .map(|candidate| {
            let heuristic = rules.score(&candidate.caption);
            let combined = blend_overall(heuristic.overall, candidate.model.overall);
            ScoredVariation {
                candidate,
                heuristic,
                combined,
            }
        })
        .collect();

    let recommended = pick_recommended(&variations);

    GenerationBatch {
        variations,
        recommended,
    }
}
