//! Admission check run once per fetched node.
//!
//! A node that passes is assumed transformable downstream without being
//! validated again.

use crate::clients::kitsu::AnimeNode;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingDescription,
    MissingAgeRating,
    MissingDates,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingDescription => "missing description",
            Self::MissingAgeRating => "missing age rating",
            Self::MissingDates => "missing start or end date",
        })
    }
}

/// Returns the first reason `node` is unusable, checked in a fixed order.
#[must_use]
pub fn rejection(node: &AnimeNode) -> Option<Rejection> {
    if !has_description(node.description.as_ref()) {
        Some(Rejection::MissingDescription)
    } else if node.age_rating.is_none() {
        Some(Rejection::MissingAgeRating)
    } else if node.start_date.is_none() || node.end_date.is_none() {
        Some(Rejection::MissingDates)
    } else {
        None
    }
}

/// Kitsu sends descriptions as a locale map, so an empty map or one holding
/// only null or blank entries counts as no description.
fn has_description(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Object(locales)) => locales
            .values()
            .any(|text| text.as_str().is_some_and(|t| !t.trim().is_empty())),
        _ => false,
    }
}

#[must_use]
pub fn is_acceptable(node: &AnimeNode) -> bool {
    rejection(node).is_none()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub accepted: usize,
    pub missing_description: usize,
    pub missing_age_rating: usize,
    pub missing_dates: usize,
}

impl FilterStats {
    pub fn record(&mut self, verdict: Option<Rejection>) {
        match verdict {
            None => self.accepted += 1,
            Some(Rejection::MissingDescription) => self.missing_description += 1,
            Some(Rejection::MissingAgeRating) => self.missing_age_rating += 1,
            Some(Rejection::MissingDates) => self.missing_dates += 1,
        }
    }

    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.missing_description + self.missing_age_rating + self.missing_dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> AnimeNode {
        AnimeNode {
            id: "1".to_string(),
            description: Some(json!({ "en": "text" })),
            age_rating: Some("PG".to_string()),
            start_date: Some("2020-01-01".to_string()),
            end_date: Some("2020-03-01".to_string()),
            ..AnimeNode::default()
        }
    }

    #[test]
    fn accepts_complete_node() {
        assert!(is_acceptable(&complete()));
    }

    #[test]
    fn rejects_each_missing_field() {
        let mut node = complete();
        node.description = None;
        assert_eq!(rejection(&node), Some(Rejection::MissingDescription));

        let mut node = complete();
        node.description = Some(serde_json::Value::Null);
        assert_eq!(rejection(&node), Some(Rejection::MissingDescription));

        let mut node = complete();
        node.age_rating = None;
        assert_eq!(rejection(&node), Some(Rejection::MissingAgeRating));

        let mut node = complete();
        node.end_date = None;
        assert_eq!(rejection(&node), Some(Rejection::MissingDates));

        let mut node = complete();
        node.start_date = None;
        assert!(!is_acceptable(&node));
    }

    #[test]
    fn rejects_empty_descriptions() {
        for empty in [json!({}), json!({ "en": null }), json!({ "en": "  " }), json!("")] {
            let mut node = complete();
            node.description = Some(empty.clone());
            assert_eq!(
                rejection(&node),
                Some(Rejection::MissingDescription),
                "{empty} should count as missing"
            );
        }
    }

    #[test]
    fn accepts_plain_text_or_any_filled_locale() {
        let mut node = complete();
        node.description = Some(json!("Space bounty hunters."));
        assert!(is_acceptable(&node));

        let mut node = complete();
        node.description = Some(json!({ "en": null, "ja_jp": "text" }));
        assert!(is_acceptable(&node));
    }

    #[test]
    fn rejection_reasons_read_as_log_text() {
        assert_eq!(Rejection::MissingDates.to_string(), "missing start or end date");
    }

    #[test]
    fn stats_count_by_reason() {
        let mut stats = FilterStats::default();
        stats.record(None);
        stats.record(Some(Rejection::MissingAgeRating));
        stats.record(Some(Rejection::MissingDates));
        stats.record(Some(Rejection::MissingDates));

        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.missing_dates, 2);
        assert_eq!(stats.rejected(), 3);
    }
}
