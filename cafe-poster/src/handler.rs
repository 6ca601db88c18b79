//! Handler-style response for schedulers that expect a `{ statusCode, body }` payload.

use cafe_poster_core::report::RunReport;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    /// JSON document serialized as a string.
    pub body: String,
}

impl HandlerResponse {
    pub fn completed(report: &RunReport) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "message": "all publishing jobs processed",
                "runId": report.run_id,
                "success": report.success_count(),
                "failed": report.fail_count(),
                "timestamp": Utc::now().to_rfc3339(),
            })
            .to_string(),
        }
    }

    pub fn failed(error: &anyhow::Error) -> Self {
        Self {
            status_code: 500,
            body: json!({
                "error": format!("{error:#}"),
                "timestamp": Utc::now().to_rfc3339(),
            })
            .to_string(),
        }
    }

    pub fn from_outcome(outcome: &anyhow::Result<RunReport>) -> Self {
        match outcome {
            Ok(report) => Self::completed(report),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_poster_core::error::PipelineError;
    use serde_json::Value;
    use uuid::Uuid;

    fn empty_report() -> RunReport {
        let now = Utc::now();
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            results: Vec::new(),
        }
    }

    #[test]
    fn completed_run_is_200_with_timestamp() {
        let report = empty_report();
        let response = HandlerResponse::from_outcome(&Ok(report.clone()));
        assert_eq!(response.status_code, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["message"], "all publishing jobs processed");
        assert_eq!(body["runId"], report.run_id.to_string());
        assert!(body["timestamp"].as_str().is_some());
    }

    #[test]
    fn top_level_error_is_500_with_message() {
        let outcome: anyhow::Result<RunReport> =
            Err(anyhow::Error::new(PipelineError::Configuration("no accounts configured".into()))
                .context("publishing run failed"));
        let response = HandlerResponse::from_outcome(&outcome);
        assert_eq!(response.status_code, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            body["error"],
            "publishing run failed: invalid configuration: no accounts configured"
        );
    }

    #[test]
    fn serializes_with_status_code_key() {
        let response = HandlerResponse {
            status_code: 200,
            body: "{}".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 200);
    }
}
