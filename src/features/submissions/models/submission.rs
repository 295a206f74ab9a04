use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::constants::{IMAGE_KEY_PREFIX, IMAGE_SERVE_PATH};
use crate::shared::types::{null_as_default, Coordinates, Scores};

/// Submission lifecycle status as the backend reports it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Classified, waiting for the user to confirm and submit
    #[default]
    Pending,
    Submitted,
    Resolved,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-reported maintenance issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Carried on the wire as `pk = "submission_{uuid}"`
    #[serde(rename = "pk", with = "submission_pk")]
    pub id: Uuid,
    /// List endpoints return the raw index key instead of `status`
    #[serde(default, alias = "gsi1pk")]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub coords_image: Coordinates,
    #[serde(default)]
    pub coords_browser: Coordinates,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevant_reports: Scores,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ml_labels: Scores,
    #[serde(default)]
    pub selected_reports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "backend_timestamp")]
    pub timestamp_submitted: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "backend_timestamp")]
    pub timestamp_resolved: Option<DateTime<Utc>>,
}

impl Submission {
    /// A freshly classified submission with nothing selected yet
    pub fn pending(id: Uuid) -> Self {
        Self {
            id,
            status: SubmissionStatus::Pending,
            coords_image: Coordinates::ZERO,
            coords_browser: Coordinates::ZERO,
            relevant_reports: Scores::new(),
            ml_labels: Scores::new(),
            selected_reports: Vec::new(),
            timestamp_submitted: None,
            timestamp_resolved: None,
        }
    }

    /// Image EXIF location when known, device location otherwise
    pub fn effective_coordinates(&self) -> Coordinates {
        Coordinates::prefer(self.coords_image, self.coords_browser)
    }

    /// The user's selection, empty until the submission has been submitted
    pub fn final_selection(&self) -> &[String] {
        match self.status {
            SubmissionStatus::Pending => &[],
            SubmissionStatus::Submitted | SubmissionStatus::Resolved => &self.selected_reports,
        }
    }

    /// Path the uploaded picture is served from
    pub fn image_path(&self) -> String {
        image_path(self.id)
    }
}

/// `/maint-img/{id}`
pub fn image_path(id: Uuid) -> String {
    format!("{}/{}", IMAGE_SERVE_PATH, id)
}

/// `maint-img/{id}`, the object storage key for a submission picture
pub fn image_key(id: Uuid) -> String {
    format!("{}/{}", IMAGE_KEY_PREFIX, id)
}

mod submission_pk {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    use crate::shared::constants::SUBMISSION_PK_PREFIX;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}{}", SUBMISSION_PK_PREFIX, id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let id = raw.strip_prefix(SUBMISSION_PK_PREFIX).unwrap_or(&raw);
        Uuid::parse_str(id).map_err(|e| D::Error::custom(format!("invalid submission pk '{}': {}", raw, e)))
    }
}

/// Backend timestamps are ISO-8601 UTC with milliseconds, except that a
/// zero sub-second part drops the seconds too (`2022-03-01T18:22Z`).
/// Anything unparseable decodes as `None` rather than failing the record.
mod backend_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const MINUTE_PRECISION: &str = "%Y-%m-%dT%H:%MZ";

    pub fn serialize<S: Serializer>(
        timestamp: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match timestamp {
            Some(ts) => serializer.serialize_some(ts),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| parse(&raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        match NaiveDateTime::parse_from_str(raw, MINUTE_PRECISION) {
            Ok(naive) => Some(naive.and_utc()),
            Err(e) => {
                tracing::warn!("Ignoring unparseable backend timestamp '{}': {}", raw, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SUBMITTED_JSON: &str = r#"{
        "pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
        "sk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
        "status": "submitted",
        "coords_image": {"latitude": 0, "longitude": 0},
        "coords_browser": {"latitude": 40.0, "longitude": -70.0},
        "relevant_reports": {"report-pothole": 97.125, "report-sidewalk": 55.5},
        "ml_labels": {"Road": 99.1, "Asphalt": 97.0},
        "selected_reports": ["report-pothole"],
        "timestamp_submitted": "2022-03-01T18:22:09.123Z"
    }"#;

    #[test]
    fn test_deserialize_backend_record() {
        let submission: Submission = serde_json::from_str(SUBMITTED_JSON).unwrap();
        assert_eq!(
            submission.id.to_string(),
            "0f8fad5b-d9cb-469f-a165-70867728950e"
        );
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.relevant_reports.len(), 2);
        assert_eq!(submission.selected_reports, vec!["report-pothole"]);
        assert!(submission.timestamp_submitted.is_some());
        assert_eq!(
            submission.effective_coordinates(),
            Coordinates::new(40.0, -70.0)
        );
    }

    #[test]
    fn test_deserialize_list_item_uses_index_key() {
        let json = r#"{
            "pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
            "gsi1pk": "submitted"
        }"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert!(submission.ml_labels.is_empty());
        assert_eq!(submission.coords_image, Coordinates::ZERO);
    }

    #[test]
    fn test_deserialize_minute_precision_timestamp() {
        let json = r#"{
            "pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
            "gsi1pk": "submitted",
            "timestamp_submitted": "2022-03-01T18:22Z"
        }"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(
            submission.timestamp_submitted,
            Some(Utc.with_ymd_and_hms(2022, 3, 1, 18, 22, 0).unwrap())
        );
    }

    #[test]
    fn test_list_with_short_timestamp_decodes() {
        let json = r#"[
            {"pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e", "gsi1pk": "submitted",
             "timestamp_submitted": "2022-03-01T18:22:09.123Z"},
            {"pk": "submission_7c9e6679-7425-40de-944b-e07fc1f90ae7", "gsi1pk": "submitted",
             "timestamp_submitted": "2022-03-01T18:22Z", "timestamp_resolved": null}
        ]"#;
        let submissions: Vec<Submission> = serde_json::from_str(json).unwrap();
        assert_eq!(submissions.len(), 2);
        assert!(submissions.iter().all(|s| s.timestamp_submitted.is_some()));
        assert_eq!(submissions[1].timestamp_resolved, None);
    }

    #[test]
    fn test_garbage_timestamp_is_dropped() {
        let json = r#"{
            "pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
            "timestamp_submitted": "yesterday"
        }"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.timestamp_submitted, None);
        assert_eq!(
            backend_timestamp::parse("2022-03-01T18:22:09Z"),
            Some(Utc.with_ymd_and_hms(2022, 3, 1, 18, 22, 9).unwrap())
        );
    }

    #[test]
    fn test_null_scores_are_empty() {
        let json = r#"{
            "pk": "submission_0f8fad5b-d9cb-469f-a165-70867728950e",
            "relevant_reports": null,
            "ml_labels": null
        }"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert!(submission.relevant_reports.is_empty());
        assert!(submission.ml_labels.is_empty());
    }

    #[test]
    fn test_timestamp_serializes_as_rfc3339() {
        let mut submission = Submission::pending(Uuid::new_v4());
        submission.timestamp_submitted =
            Some(Utc.with_ymd_and_hms(2022, 3, 1, 18, 22, 0).unwrap());
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["timestamp_submitted"], "2022-03-01T18:22:00Z");
        assert!(value.get("timestamp_resolved").is_none());
    }

    #[test]
    fn test_invalid_pk_is_rejected() {
        let json = r#"{"pk": "submission_not-a-uuid"}"#;
        assert!(serde_json::from_str::<Submission>(json).is_err());
    }

    #[test]
    fn test_serialize_restores_pk_prefix() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(Submission::pending(id)).unwrap();
        assert_eq!(value["pk"], format!("submission_{}", id));
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn test_final_selection_ignored_while_pending() {
        let mut submission = Submission::pending(Uuid::new_v4());
        submission.selected_reports = vec!["report-pothole".to_string()];
        assert!(submission.final_selection().is_empty());

        submission.status = SubmissionStatus::Submitted;
        assert_eq!(submission.final_selection(), ["report-pothole".to_string()]);
    }

    #[test]
    fn test_image_paths() {
        let id = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        assert_eq!(image_path(id), "/maint-img/0f8fad5b-d9cb-469f-a165-70867728950e");
        assert_eq!(image_key(id), "maint-img/0f8fad5b-d9cb-469f-a165-70867728950e");
    }
}
