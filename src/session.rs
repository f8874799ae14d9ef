use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::planner::PlannerStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Starter,
    Pro,
}

impl Tier {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "starter" | "free" => Some(Tier::Starter),
            "pro" | "paid" => Some(Tier::Pro),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Pro => "pro",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Starter => "Starter",
            Tier::Pro => "Pro",
        }
    }

    pub fn daily_quota(self, quota: &QuotaConfig) -> Option<u32> {
        match self {
            Tier::Starter => Some(quota.starter_daily),
            Tier::Pro => quota.pro_daily,
        }
    }

    pub fn shows_details(self) -> bool {
        matches!(self, Tier::Pro)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub starter_daily: u32,
    pub pro_daily: Option<u32>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            starter_daily: 5,
            pro_daily: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuotaStatus {
    pub used: u32,
    pub limit: Option<u32>,
}

impl QuotaStatus {
    pub fn remaining(self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }
}

#[derive(Debug, Clone)]
struct GenerationLedger {
    day: NaiveDate,
    used: u32,
}

impl GenerationLedger {
    fn new(day: NaiveDate) -> Self {
        Self { day, used: 0 }
    }

    fn roll(&mut self, today: NaiveDate) {
        if self.day != today {
            self.day = today;
            self.used = 0;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    tier: Tier,
    quota: QuotaConfig,
    ledger: GenerationLedger,
    pub planner: PlannerStore,
}

impl Session {
    pub fn new(tier: Tier, quota: QuotaConfig, today: NaiveDate) -> Self {
        Self {
            tier,
            quota,
            ledger: GenerationLedger::new(today),
            planner: PlannerStore::new(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    pub fn quota_status(&mut self, today: NaiveDate) -> QuotaStatus {
        self.ledger.roll(today);
        QuotaStatus {
            used: self.ledger.used,
            limit: self.tier.daily_quota(&self.quota),
        }
    }

    pub fn ensure_quota(&mut self, today: NaiveDate) -> Result<()> {
        self.ledger.roll(today);
        if let Some(limit) = self.tier.daily_quota(&self.quota) {
            if self.ledger.used >= limit {
                return Err(ForgeError::QuotaExceeded {
                    used: self.ledger.used,
                    limit,
                });
            }
        }
        Ok(())
    }

    pub fn record_generation(&mut self, today: NaiveDate) {
        self.ledger.roll(today);
        self.ledger.used += 1;
    }
}
