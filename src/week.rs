use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::planner::{PlannerItem, PlannerStore};

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub items: Vec<PlannerItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub anchor: NaiveDate,
    pub monday: NaiveDate,
    pub days: Vec<DayPlan>,
}

pub fn monday_of(anchor: NaiveDate) -> NaiveDate {
    anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64)
}

pub fn week_days(anchor: NaiveDate) -> [NaiveDate; 7] {
    let monday = monday_of(anchor);
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

pub fn week_view(store: &PlannerStore, anchor: NaiveDate) -> WeekView {
    let monday = monday_of(anchor);
    let days = week_days(anchor)
        .into_iter()
        .map(|date| DayPlan {
            date,
            items: store
                .list_for_day(date)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect();

    WeekView {
        anchor,
        monday,
        days,
    }
}
