use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use caption_forge::{
    GenerationBatch, GenerationRequest, HeuristicScore, ModelScores, NewItem, PerformanceReport,
    Platform, PlannerItem, QuotaStatus, ScoredVariation, Tier, VariationCandidate,
};

#[derive(Debug, Deserialize)]
pub struct ApiGenerateRequest {
    pub message: Option<String>,
    pub extra_context: Option<String>,
    pub platform: Option<String>,
    pub brand: Option<String>,
    pub niche: Option<String>,
    pub tone: Option<String>,
    pub copy_mode: Option<String>,
    pub request_id: Option<String>,
}

impl ApiGenerateRequest {
    pub fn into_request(self) -> Result<GenerationRequest, String> {
        let mut request = GenerationRequest::default();

        let message = self.message.unwrap_or_default().trim().to_string();
        if message.is_empty() {
            return Err("message is required".to_string());
        }
        request.message = message;

        if let Some(platform) = self.platform.as_deref() {
            request.platform = Platform::from_str(platform)
                .ok_or_else(|| format!("invalid platform: {}", platform))?;
        }

        if let Some(value) = self.brand {
            request.brand = value;
        }
        if let Some(value) = self.niche {
            request.niche = value;
        }
        if let Some(value) = self.tone {
            request.tone = value;
        }
        if let Some(value) = self.copy_mode {
            request.copy_mode = value;
        }
        if let Some(value) = self.extra_context {
            if !value.trim().is_empty() {
                request.extra_context = Some(value);
            }
        }

        Ok(request)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiQuota {
    pub used: u32,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

impl From<QuotaStatus> for ApiQuota {
    fn from(status: QuotaStatus) -> Self {
        Self {
            used: status.used,
            limit: status.limit,
            remaining: status.remaining(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiVariation {
    pub title: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub score: f64,
    pub recommended: bool,
    pub heuristic: Option<HeuristicScore>,
    pub model: Option<ModelScores>,
    pub locked: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiGenerateResponse {
    pub request_id: String,
    pub variations: Vec<ApiVariation>,
    pub recommended: Option<usize>,
    pub quota: ApiQuota,
    pub warnings: Vec<String>,
}

impl ApiGenerateResponse {
    pub fn from_batch(
        batch: GenerationBatch,
        tier: Tier,
        quota: QuotaStatus,
        warnings: Vec<String>,
        request_id: String,
    ) -> Self {
        let show_details = tier.shows_details();
        let recommended = batch.recommended;
        let variations = batch
            .variations
            .into_iter()
            .enumerate()
            .map(|(index, variation)| {
                let ScoredVariation {
                    candidate,
                    heuristic,
                    combined,
                } = variation;
                let VariationCandidate {
                    title,
                    caption,
                    hashtags,
                    model,
                    ..
                } = candidate;
                ApiVariation {
                    title,
                    caption,
                    hashtags,
                    score: combined,
                    recommended: recommended == Some(index),
                    heuristic: if show_details { Some(heuristic) } else { None },
                    model: if show_details { Some(model) } else { None },
                    locked: !show_details,
                }
            })
            .collect();

        Self {
            request_id,
            variations,
            recommended,
            quota: quota.into(),
            warnings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiNewItem {
    pub date: String,
    pub time: String,
    pub platform: String,
    pub title: String,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub score: Option<f64>,
}

impl ApiNewItem {
    pub fn into_new_item(self) -> Result<NewItem, String> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {}", self.date))?;
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&self.time, "%H:%M:%S"))
            .map_err(|_| format!("invalid time (expected HH:MM): {}", self.time))?;
        let platform = Platform::from_str(&self.platform)
            .ok_or_else(|| format!("invalid platform: {}", self.platform))?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err("title is required".to_string());
        }

        Ok(NewItem {
            date,
            time,
            platform,
            title,
            caption: self.caption.unwrap_or_default(),
            hashtags: self.hashtags.unwrap_or_default(),
            score: self.score.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiSessionResponse {
    pub tier: String,
    pub tier_label: String,
    pub today: NaiveDate,
    pub quota: ApiQuota,
}

impl ApiSessionResponse {
    pub fn new(tier: Tier, today: NaiveDate, quota: QuotaStatus) -> Self {
        Self {
            tier: tier.as_str().to_string(),
            tier_label: tier.label().to_string(),
            today,
            quota: quota.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiSetTierRequest {
    pub tier: String,
}

#[derive(Debug, Serialize)]
pub struct ApiUpdateResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiRemoveResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiPerformanceResponse {
    pub completed: usize,
    pub mean_score: Option<f64>,
    pub top_hour: Option<u32>,
    pub recent: Vec<PlannerItem>,
    pub locked: bool,
}

impl ApiPerformanceResponse {
    pub fn from_report(report: PerformanceReport, tier: Tier) -> Self {
        if tier.shows_details() {
            Self {
                completed: report.completed,
                mean_score: report.mean_score,
                top_hour: report.top_hour,
                recent: report.recent,
                locked: false,
            }
        } else {
            Self {
                completed: report.completed,
                mean_score: None,
                top_hour: None,
                recent: Vec::new(),
                locked: true,
            }
        }
    }
}
