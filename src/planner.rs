use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{clamp_score, normalize_hashtags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Linkedin,
    Facebook,
    Youtube,
    X,
}

impl Platform {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "tiktok" => Some(Platform::Tiktok),
            "linkedin" => Some(Platform::Linkedin),
            "facebook" | "fb" => Some(Platform::Facebook),
            "youtube" | "yt" => Some(Platform::Youtube),
            "x" | "twitter" => Some(Platform::X),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Linkedin => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Youtube => "youtube",
            Platform::X => "x",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Planned,
    Done,
}

impl ItemStatus {
    pub fn is_done(self) -> bool {
        matches!(self, ItemStatus::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerItem {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub platform: Platform,
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub score: f64,
    pub status: ItemStatus,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub platform: Platform,
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PlannerStore {
    items: Vec<PlannerItem>,
}

impl PlannerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, new_item: NewItem) -> PlannerItem {
        let item = PlannerItem {
            id: Uuid::new_v4(),
            date: new_item.date,
            time: new_item.time,
            platform: new_item.platform,
            title: new_item.title.trim().to_string(),
            caption: new_item.caption,
            hashtags: normalize_hashtags(new_item.hashtags),
            score: clamp_score(new_item.score),
            status: ItemStatus::Planned,
        };
        self.items.push(item.clone());
        item
    }

    pub fn get(&self, id: Uuid) -> Option<&PlannerItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn list_for_day(&self, date: NaiveDate) -> Vec<&PlannerItem> {
        let mut day_items: Vec<&PlannerItem> = self
            .items
            .iter()
            .filter(|item| item.date == date)
            .collect();
        day_items.sort_by_key(|item| item.time);
        day_items
    }

    pub fn mark_done(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.status = ItemStatus::Done;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[PlannerItem] {
        &self.items
    }

    pub fn done_items(&self) -> Vec<&PlannerItem> {
        self.items
            .iter()
            .filter(|item| item.status.is_done())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
