//! Bypass-intent keyword tiers.
//!
//! Tiers are checked HIGH, then MEDIUM, then LOW; the first tier with any
//! substring hit decides. A message with both a HIGH and a LOW phrase is HIGH.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentLevel {
    High,
    Medium,
    Low,
    None,
}

impl fmt::Display for IntentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntentLevel::High => "HIGH",
            IntentLevel::Medium => "MEDIUM",
            IntentLevel::Low => "LOW",
            IntentLevel::None => "NONE",
        })
    }
}

/// Direct-payment solicitation, commission avoidance.
pub const HIGH_KEYWORDS: &[&str] = &[
    "direct payment",
    "pay directly",
    "pay me directly",
    "outside platform",
    "cheaper if",
    "save commission",
    "no commission",
    "without platform",
    "bank transfer",
    "google pay me",
    "paytm me",
    "phonepe me",
    "cash payment",
    "meet and pay",
    "pay outside",
];

/// Requests for a side channel.
pub const MEDIUM_KEYWORDS: &[&str] = &[
    "call me",
    "text me",
    "message me",
    "contact me",
    "reach me",
    "whatsapp",
    "telegram",
    "personal number",
    "my number",
    "discuss outside",
    "talk on phone",
];

/// Vague deferrals. Never flagged on their own.
pub const LOW_KEYWORDS: &[&str] = &[
    "can we talk",
    "later discuss",
    "after this",
    "personally",
    "offline",
    "in person",
];

const TIERS: [(IntentLevel, &[&str]); 3] = [
    (IntentLevel::High, HIGH_KEYWORDS),
    (IntentLevel::Medium, MEDIUM_KEYWORDS),
    (IntentLevel::Low, LOW_KEYWORDS),
];

/// `lowercased` must already be lowercased (see `text::normalize_for_intent`).
pub fn classify_intent(lowercased: &str) -> IntentLevel {
    TIERS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowercased.contains(w)))
        .map(|(level, _)| *level)
        .unwrap_or(IntentLevel::None)
}
