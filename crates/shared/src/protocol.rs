use serde::{Deserialize, Serialize};

/// Server-side judgment of the exercise posture in the latest frames.
///
/// Anything the server reports outside of "good"/"bad" (including the empty
/// string it sends before the first classification) collapses into
/// `Unspecified` and renders as neutral UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Good,
    Bad,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// One poll's view of the detection session. Never cached: each snapshot
/// fully replaces whatever the UI showed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default)]
    pub form_status: FormStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
}

impl StatusSnapshot {
    /// Angle text if the server reported one; empty strings count as absent.
    pub fn angle_text(&self) -> Option<&str> {
        self.angle.as_deref().filter(|text| !text.is_empty())
    }

    pub fn feedback_text(&self) -> Option<&str> {
        self.feedback.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub exercise_type: String,
}

/// Acknowledgement body of the start/stop commands. The text is only ever
/// logged; the client takes no decision from it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommandAck {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_status_deserializes_to_neutral_defaults() {
        let snapshot: StatusSnapshot = serde_json::from_str(r#"{"running": false}"#).expect("parse");
        assert!(!snapshot.running);
        assert_eq!(snapshot.angle, None);
        assert_eq!(snapshot.form_status, FormStatus::Unspecified);
        assert_eq!(snapshot.feedback, None);
        assert_eq!(snapshot.exercise_type, None);
    }

    #[test]
    fn full_status_deserializes_all_fields() {
        let snapshot: StatusSnapshot = serde_json::from_str(
            r#"{
                "running": true,
                "angle": "Shoulder Angle: 45°",
                "form_status": "good",
                "feedback": "Good Form!",
                "exercise_type": "hand_raise"
            }"#,
        )
        .expect("parse");
        assert!(snapshot.running);
        assert_eq!(snapshot.angle_text(), Some("Shoulder Angle: 45°"));
        assert_eq!(snapshot.form_status, FormStatus::Good);
        assert_eq!(snapshot.feedback_text(), Some("Good Form!"));
        assert_eq!(snapshot.exercise_type.as_deref(), Some("hand_raise"));
    }

    #[test]
    fn unknown_form_status_collapses_to_unspecified() {
        let snapshot: StatusSnapshot =
            serde_json::from_str(r#"{"running": true, "form_status": "warming_up"}"#)
                .expect("parse");
        assert_eq!(snapshot.form_status, FormStatus::Unspecified);

        let empty: StatusSnapshot =
            serde_json::from_str(r#"{"running": true, "form_status": ""}"#).expect("parse");
        assert_eq!(empty.form_status, FormStatus::Unspecified);
    }

    #[test]
    fn empty_angle_and_feedback_count_as_absent() {
        let snapshot: StatusSnapshot =
            serde_json::from_str(r#"{"running": true, "angle": "", "feedback": ""}"#)
                .expect("parse");
        assert_eq!(snapshot.angle_text(), None);
        assert_eq!(snapshot.feedback_text(), None);
    }

    #[test]
    fn start_request_serializes_exercise_type() {
        let body = serde_json::to_string(&StartRequest {
            exercise_type: "hand_curl".to_string(),
        })
        .expect("serialize");
        assert_eq!(body, r#"{"exercise_type":"hand_curl"}"#);
    }
}
