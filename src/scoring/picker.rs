use crate::scoring::ScoredVariation;

pub fn pick_recommended(variations: &[ScoredVariation]) -> Option<usize> {
    let mut pick = None;
    let mut best_seen = f64::NEG_INFINITY;

    for (index, variation) in variations.iter().enumerate() {
        if variation.candidate.source_recommended || variation.combined > best_seen {
            pick = Some(index);
        }
        if variation.combined > best_seen {
            best_seen = variation.combined;
        }
    }

    pick
}
