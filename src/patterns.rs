//! Contact-info matchers.
//!
//! The rule table is plain data: every entry is `(category, severity, name, regex)`
//! and `detect` runs all of them independently. A message may produce several
//! detections, including several in one category. New categories only need a
//! new `Category` variant and table rows; the verdict engine never looks at
//! individual rules.
//!
//! UPI ids share the general shape of an email address, so an address usually
//! yields EMAIL, UPI and SOCIAL (`@handle`) detections at once. That overlap is
//! kept on purpose: the guard prefers over-blocking to missed contact leaks.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Phone,
    Email,
    Upi,
    Social,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Phone => "PHONE",
            Category::Email => "EMAIL",
            Category::Upi => "UPI",
            Category::Social => "SOCIAL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a detection or a recorded violation.
/// `Low` only exists for the ledger's delta table; no matcher emits it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub category: Category,
    pub matched_snippets: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug)]
pub struct PatternRule {
    pub category: Category,
    pub severity: Severity,
    pub name: &'static str,
    pub regex: Regex,
}

fn rule(category: Category, severity: Severity, name: &'static str, re: &str) -> PatternRule {
    PatternRule {
        category,
        severity,
        name,
        regex: Regex::new(re).unwrap(),
    }
}

pub static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    use Category::*;
    use Severity::*;
    vec![
        // +91 optional, 10 digits starting 6-9
        rule(Phone, High, "indian_mobile", r"(?:\+91[\s-]?)?[6-9]\d{9}"),
        // 98765 43210
        rule(Phone, High, "spaced_mobile", r"(?:\+91[\s-]?)?\d{5}[\s-]?\d{5}"),
        rule(Phone, High, "ten_digits", r"\b\d{10}\b"),
        // (555) 123-4567, +1 555 123 4567
        rule(
            Phone,
            High,
            "international",
            r"(?:\+\d{1,3}[\s-]?)?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{4}",
        ),
        rule(Email, High, "address", r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}"),
        // john[at]acme[dot]com, john at acme dot com, john at acme.com
        // A word-form `at` followed by a bare `.` only counts for a known TLD,
        // so "at home.Thanks" stays clean.
        rule(
            Email,
            High,
            "spelled_out",
            r"(?i)[a-z0-9._%+-]+(?:(?:\s*@\s*|\s*[\[(]at[\])]\s*)[a-z0-9-]+(?:\.|\s+dot\s+|\s*[\[(]dot[\])]\s*)[a-z]{2,}|\s+at\s+[a-z0-9-]+(?:(?:\s+dot\s+|\s*[\[(]dot[\])]\s*)[a-z]{2,}|\.(?:com|net|org|info|biz|edu|gov|co|in|io|me|uk|us)))\b",
        ),
        rule(Upi, High, "vpa", r"(?i)[a-z0-9._-]+@[a-z]{2,}"),
        rule(Upi, High, "payment_app", r"(?i)\b(?:paytm|gpay|phonepe|upi)\b"),
        rule(
            Social,
            Medium,
            "platform",
            r"(?i)\b(?:whatsapp|whats\s*app|wa|telegram|tg|instagram|insta|ig)\b",
        ),
        rule(Social, Medium, "handle", r"(?i)@[a-z0-9_]{3,}"),
        rule(Social, Medium, "telegram_link", r"(?i)t\.me/[a-z0-9_]+"),
    ]
});

/// Run every rule against `message`. One detection per matching rule, in
/// table order (PHONE, EMAIL, UPI, SOCIAL).
pub fn detect(message: &str) -> Vec<Detection> {
    let folded = text::fold(message);
    RULES
        .iter()
        .filter_map(|r| {
            let matched: Vec<String> = r
                .regex
                .find_iter(&folded)
                .map(|m| m.as_str().to_string())
                .collect();
            (!matched.is_empty()).then(|| Detection {
                category: r.category,
                matched_snippets: matched,
                severity: r.severity,
            })
        })
        .collect()
}

pub fn has_high_severity(detections: &[Detection]) -> bool {
    detections.iter().any(|d| d.severity == Severity::High)
}

/// Distinct categories in first-seen order, e.g. for log fields and reasons.
pub fn categories(detections: &[Detection]) -> Vec<Category> {
    let mut out: Vec<Category> = Vec::new();
    for d in detections {
        if !out.contains(&d.category) {
            out.push(d.category);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(msg: &str) -> Vec<Category> {
        categories(&detect(msg))
    }

    #[test]
    fn indian_mobile_with_and_without_prefix() {
        assert_eq!(cats("call me at 9876543210"), vec![Category::Phone]);
        assert_eq!(cats("+91 9876543210"), vec![Category::Phone]);
        assert_eq!(cats("ping 98765 43210 tonight"), vec![Category::Phone]);
    }

    #[test]
    fn phone_rules_are_independent() {
        // a bare 10-digit mobile hits indian_mobile, spaced_mobile, ten_digits and international
        let d = detect("9876543210");
        assert_eq!(d.len(), 4);
        assert!(d.iter().all(|x| x.category == Category::Phone && x.severity == Severity::High));
        assert_eq!(d[0].matched_snippets, vec!["9876543210".to_string()]);
    }

    #[test]
    fn international_shape() {
        assert_eq!(cats("reach (555) 123-4567"), vec![Category::Phone]);
    }

    #[test]
    fn fullwidth_digits_are_folded() {
        assert_eq!(cats("９８７６５４３２１０"), vec![Category::Phone]);
    }

    #[test]
    fn uppercase_lookalikes_are_folded() {
        // Cyrillic А (U+0410)
        assert_eq!(cats("WH\u{0410}TSAPP me"), vec![Category::Social]);
        assert_eq!(cats("\u{0420}AYTM me"), vec![Category::Upi]);
    }

    #[test]
    fn plain_email_also_counts_as_upi_and_handle() {
        let d = detect("my email is john@acme.com, email me there");
        let c = categories(&d);
        assert_eq!(c, vec![Category::Email, Category::Upi, Category::Social]);
        let email = d.iter().find(|x| x.category == Category::Email).unwrap();
        assert_eq!(email.matched_snippets, vec!["john@acme.com".to_string()]);
        assert_eq!(email.severity, Severity::High);
    }

    #[test]
    fn spelled_out_email() {
        assert_eq!(cats("write to john at acme dot com"), vec![Category::Email]);
        assert_eq!(cats("john[at]acme[dot]com"), vec![Category::Email]);
        assert_eq!(cats("JOHN AT ACME DOT COM"), vec![Category::Email]);
        assert_eq!(cats("mail john at gmail.com"), vec![Category::Email]);
    }

    #[test]
    fn spelled_out_email_ignores_ordinary_sentences() {
        assert!(detect("meet at gate. see you there").is_empty());
        assert!(detect("what about this seat").is_empty());
        assert!(detect("I'm at home.Thanks for the tickets").is_empty());
        assert!(detect("see you at gate.Bring the passes").is_empty());
    }

    #[test]
    fn upi_handle_and_apps() {
        let c = cats("send to rahul@okaxis");
        assert!(c.contains(&Category::Upi));
        assert!(!c.contains(&Category::Email));
        assert_eq!(cats("I use GPay"), vec![Category::Upi]);
        assert_eq!(cats("paytm works"), vec![Category::Upi]);
        // word boundary: "upide" is not "upi"
        assert!(detect("upide").is_empty());
    }

    #[test]
    fn social_platforms_handles_and_links() {
        let d = detect("let's discuss on whatsapp");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].category, Category::Social);
        assert_eq!(d[0].severity, Severity::Medium);

        assert_eq!(cats("add me on Insta"), vec![Category::Social]);
        assert_eq!(cats("whats app me"), vec![Category::Social]);
        assert_eq!(cats("follow @concert_fan"), vec![Category::Social]);
        assert_eq!(cats("t.me/ticketguy"), vec![Category::Social]);
        // handle needs three chars
        assert!(detect("@ab").is_empty());
    }

    #[test]
    fn clean_messages_have_no_detections() {
        assert!(detect("").is_empty());
        assert!(detect("Is the seat still available? Price 1500 is fine").is_empty());
        assert!(detect("maybe we can talk personally").is_empty());
    }

    #[test]
    fn multiple_snippets_per_rule() {
        let d = detect("9876543210 or 9123456780");
        assert_eq!(d[0].matched_snippets.len(), 2);
    }
}
