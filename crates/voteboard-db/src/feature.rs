use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{VoteboardError, VoteboardResult};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A persisted feature request. Identifier and creation timestamp are
/// assigned by the store and immutable afterwards; `votes` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub votes: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Feature {
    pub fn new(request: NewFeature) -> Self {
        let category = request
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Self {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            category,
            votes: 0,
            created_at: now_to_millis(),
        }
    }
}

/// A candidate feature supplied by the caller, not yet persisted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewFeature {
    #[validate(length(min = 1, max = 100, message = "title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "description must be between 1 and 1000 characters"
    ))]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewFeature {
    pub fn validated(&self) -> VoteboardResult<()> {
        self.validate().map_err(validation_error)
    }
}

fn validation_error(errors: ValidationErrors) -> VoteboardError {
    for (field, field_errors) in errors.field_errors() {
        if let Some(err) = field_errors.first() {
            let message = err
                .message
                .clone()
                .map(|msg| msg.into_owned())
                .unwrap_or_else(|| format!("invalid value for {field}"));
            return VoteboardError::Validation {
                field: field.to_string(),
                message,
            };
        }
    }
    VoteboardError::Validation {
        field: "request".to_string(),
        message: "invalid request".to_string(),
    }
}

// The on-disk format carries millisecond precision; truncate up front so the
// record handed back by `add` equals what a later load yields.
fn now_to_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.timestamp_subsec_millis() * 1_000_000)
        .unwrap_or(now)
}

/// Fixed `YYYY-MM-DDTHH:mm:ss.sssZ` wire format for `created_at`. Decoding
/// accepts any RFC 3339 timestamp, which historical data files may carry.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn candidate(title: &str, description: &str) -> NewFeature {
        NewFeature {
            title: title.to_string(),
            description: description.to_string(),
            category: None,
        }
    }

    #[test]
    fn validation_accepts_values_at_the_bounds() {
        assert!(candidate(&"t".repeat(100), &"d".repeat(1000))
            .validated()
            .is_ok());
        assert!(candidate("t", "d").validated().is_ok());
    }

    #[test]
    fn validation_rejects_empty_title_with_field_context() {
        let err = candidate("", "a description").validated().unwrap_err();
        match err {
            VoteboardError::Validation { field, message } => {
                assert_eq!(field, "title");
                assert!(message.contains("title"));
            }
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_overlong_title() {
        let err = candidate(&"t".repeat(101), "a description")
            .validated()
            .unwrap_err();
        assert!(matches!(err, VoteboardError::Validation { field, .. } if field == "title"));
    }

    #[test]
    fn validation_rejects_empty_and_overlong_description() {
        let err = candidate("a title", "").validated().unwrap_err();
        assert!(matches!(err, VoteboardError::Validation { field, .. } if field == "description"));

        let err = candidate("a title", &"d".repeat(1001))
            .validated()
            .unwrap_err();
        assert!(matches!(err, VoteboardError::Validation { field, .. } if field == "description"));
    }

    #[test]
    fn blank_category_defaults_to_uncategorized() {
        let mut request = candidate("a title", "a description");
        request.category = Some("  ".to_string());
        assert_eq!(Feature::new(request).category, DEFAULT_CATEGORY);

        let request = candidate("a title", "a description");
        assert_eq!(Feature::new(request).category, DEFAULT_CATEGORY);

        let mut request = candidate("a title", "a description");
        request.category = Some("UX".to_string());
        assert_eq!(Feature::new(request).category, "UX");
    }

    #[test]
    fn new_feature_starts_with_zero_votes_and_a_fresh_id() {
        let feature = Feature::new(candidate("a title", "a description"));
        assert_eq!(feature.votes, 0);
        assert!(!feature.id.is_empty());
    }

    #[test]
    fn created_at_serializes_with_millisecond_precision() {
        let feature = Feature {
            id: "abc".to_string(),
            title: "a title".to_string(),
            description: "a description".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            votes: 3,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 7).unwrap(),
        };
        let encoded = serde_json::to_string(&feature).unwrap();
        assert!(
            encoded.contains("\"2024-03-05T09:30:07.000Z\""),
            "unexpected timestamp encoding: {encoded}"
        );
    }

    #[test]
    fn created_at_round_trips_through_json() {
        let feature = Feature::new(candidate("a title", "a description"));
        let encoded = serde_json::to_string(&feature).unwrap();
        let decoded: Feature = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, feature);
    }

    #[test]
    fn created_at_accepts_rfc3339_with_offset() {
        let raw = r#"{
            "id": "abc",
            "title": "a title",
            "description": "a description",
            "category": "Uncategorized",
            "votes": 0,
            "created_at": "2024-03-05T10:30:00+01:00"
        }"#;
        let feature: Feature = serde_json::from_str(raw).unwrap();
        assert_eq!(
            feature.created_at,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap()
        );
    }
}
