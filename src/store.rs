//! Per-user risk state behind a trait, so the verdict engine and the escrow
//! policy can run against the in-process map, a persistent backend, or a test fake.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::patterns::{Detection, Severity};

/// Upper bound of `riskScore`.
pub const MAX_RISK_SCORE: u8 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub detections: Vec<Detection>,
    /// Bounded prefix of the flagged message, never the full text.
    pub message_sample: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRiskRecord {
    pub user_id: String,
    pub risk_score: u8,
    pub violations: Vec<Violation>,
}

impl UserRiskRecord {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            risk_score: 0,
            violations: Vec::new(),
        }
    }
}

pub trait RiskStore: Send + Sync {
    fn get(&self, user_id: &str) -> Option<UserRiskRecord>;

    /// Replace the whole record (admin reset goes through here).
    fn put(&self, record: UserRiskRecord);

    /// Atomically: create the record if absent, append `violation`, raise the
    /// score by `delta` clamped to [`MAX_RISK_SCORE`]. Returns the new score.
    /// Two concurrent calls for the same user must both land.
    fn append_violation(&self, user_id: &str, violation: Violation, delta: u8) -> u8;

    /// Every record currently held.
    fn records(&self) -> Vec<UserRiskRecord>;
}

/// Process-lifetime store. Each user keeps at most `max_violations` most
/// recent violations; eviction never lowers the score.
#[derive(Debug)]
pub struct MemoryRiskStore {
    records: DashMap<String, UserRiskRecord>,
    max_violations: usize,
}

impl MemoryRiskStore {
    pub fn new(max_violations: usize) -> Self {
        Self {
            records: DashMap::new(),
            max_violations: max_violations.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryRiskStore {
    fn default() -> Self {
        Self::new(crate::config::GuardConfig::default().max_violations_per_user)
    }
}

impl RiskStore for MemoryRiskStore {
    fn get(&self, user_id: &str) -> Option<UserRiskRecord> {
        self.records.get(user_id).map(|r| r.value().clone())
    }

    fn put(&self, record: UserRiskRecord) {
        self.records.insert(record.user_id.clone(), record);
    }

    fn append_violation(&self, user_id: &str, violation: Violation, delta: u8) -> u8 {
        // the entry guard holds the shard lock for the whole update
        let mut entry = self
            .records
            .entry(user_id.to_string())
            .or_insert_with(|| UserRiskRecord::empty(user_id));
        let rec = entry.value_mut();

        rec.violations.push(violation);
        if rec.violations.len() > self.max_violations {
            let excess = rec.violations.len() - self.max_violations;
            rec.violations.drain(..excess);
        }
        rec.risk_score = rec.risk_score.saturating_add(delta).min(MAX_RISK_SCORE);
        rec.risk_score
    }

    fn records(&self) -> Vec<UserRiskRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}
