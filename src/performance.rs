use chrono::Timelike;
use serde::Serialize;

use crate::planner::PlannerItem;
use crate::round2;

pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub completed: usize,
    pub mean_score: Option<f64>,
    pub top_hour: Option<u32>,
    pub recent: Vec<PlannerItem>,
}

pub fn aggregate<'a, I>(done: I) -> PerformanceReport
where
    I: IntoIterator<Item = &'a PlannerItem>,
{
    let items: Vec<&PlannerItem> = done.into_iter().collect();
    let completed = items.len();

    let mean_score = if items.is_empty() {
        None
    } else {
        let total: f64 = items.iter().map(|item| item.score).sum();
        Some(round2(total / completed as f64))
    };

    let top_hour = most_frequent_hour(&items);

    let mut recent: Vec<PlannerItem> = items.iter().map(|item| (*item).clone()).collect();
    recent.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
    recent.truncate(RECENT_LIMIT);

    PerformanceReport {
        completed,
        mean_score,
        top_hour,
        recent,
    }
}

fn most_frequent_hour(items: &[&PlannerItem]) -> Option<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for item in items {
        let hour = item.time.hour();
        match counts.iter_mut().find(|(seen, _)| *seen == hour) {
            Some((_, count)) => *count += 1,
            None => counts.push((hour, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (hour, count) in counts {
        let replace = match best {
            None => true,
            Some((_, best_count)) => count > best_count,
        };
        if replace {
            best = Some((hour, count));
        }
    }

    best.map(|(hour, _)| hour)
}
