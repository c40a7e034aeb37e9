//! Best-effort error reporting.
//!
//! # Design Decisions
//! - Delivery is fire-and-forget: failures are logged, never propagated, and
//!   never retried (the monitoring sink must not become another dependency
//!   that can take the UI down)
//! - Reports carry the wire field names the monitoring endpoint expects

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Structured report for a caught rendering/async error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_stack: Option<String>,
    pub context: ReportContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub retry_count: u32,
}

impl ErrorReport {
    pub fn new(name: &str, message: &str, retry_count: u32) -> Self {
        Self {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            error: ErrorDetail {
                name: name.to_string(),
                message: message.to_string(),
                stack: None,
            },
            component_stack: None,
            context: ReportContext {
                user_agent: None,
                url: None,
                retry_count,
            },
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.error.stack = Some(stack.into());
        self
    }

    pub fn with_component_stack(mut self, stack: impl Into<String>) -> Self {
        self.component_stack = Some(stack.into());
        self
    }

    pub fn with_context(mut self, user_agent: Option<String>, url: Option<String>) -> Self {
        self.context.user_agent = user_agent;
        self.context.url = url;
        self
    }
}

/// Posts reports to an external monitoring endpoint.
#[derive(Clone)]
pub struct ErrorReporter {
    endpoint: String,
    client: reqwest::Client,
}

impl ErrorReporter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Submit a report without waiting for delivery.
    pub fn submit(&self, report: ErrorReport) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            match client.post(&endpoint).json(&report).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        status = %response.status(),
                        "Monitoring endpoint rejected error report"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to deliver error report");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_field_names() {
        let report = ErrorReport::new("Error", "rate limit exceeded", 2)
            .with_stack("at generateItinerary")
            .with_component_stack("ItineraryView > TripPlanner")
            .with_context(Some("Mozilla/5.0".into()), Some("/plan".into()));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["timestamp"].is_number());
        assert_eq!(json["error"]["name"], "Error");
        assert_eq!(json["error"]["message"], "rate limit exceeded");
        assert_eq!(json["error"]["stack"], "at generateItinerary");
        assert_eq!(json["componentStack"], "ItineraryView > TripPlanner");
        assert_eq!(json["context"]["userAgent"], "Mozilla/5.0");
        assert_eq!(json["context"]["url"], "/plan");
        assert_eq!(json["context"]["retryCount"], 2);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(ErrorReport::new("Error", "boom", 0)).unwrap();
        assert!(json["error"].get("stack").is_none());
        assert!(json.get("componentStack").is_none());
        assert!(json["context"].get("userAgent").is_none());
    }
}
