//! Audit trail for security-relevant actions.
//!
//! Events are emitted on the `audit` tracing target so the subscriber can
//! route them separately from application logs.
//!
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new("event.approve", AuditOutcome::Success)
//!     .user(identity.user_id)
//!     .resource("event", event_id)
//!     .from_headers(&headers)
//!     .log();
//!
//! AuditEvent::new("event.delete", AuditOutcome::Denied)
//!     .user(identity.user_id)
//!     .resource("event", event_id)
//!     .with_details(json!({"reason": "not_owner"}))
//!     .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    /// Rejected input or system error
    Failure,
    /// Refused by authentication or authorization
    Denied,
}

/// Structured audit record; build it, then call [`AuditEvent::log`].
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub outcome: AuditOutcome,
    pub user_id: Option<String>,
    /// `kind:id`, e.g. `event:0191...`
    pub resource: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, outcome: AuditOutcome) -> Self {
        Self {
            action: action.into(),
            outcome,
            user_id: None,
            resource: None,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn user(mut self, user_id: impl Display) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn resource(mut self, kind: &str, id: impl Display) -> Self {
        self.resource = Some(format!("{}:{}", kind, id));
        self
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Client IP and user agent from request headers
    pub fn from_headers(self, headers: &HeaderMap) -> Self {
        self.with_ip(extract_ip_from_headers(headers))
            .with_user_agent(extract_user_agent(headers))
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Emit on the `audit` target
    pub fn log(self) {
        tracing::info!(
            target: "audit",
            action = %self.action,
            outcome = ?self.outcome,
            user_id = self.user_id,
            resource = self.resource,
            ip = self.ip_address,
            user_agent = self.user_agent,
            details = ?self.details,
            "{}",
            serde_json::to_string(&self).unwrap_or_else(|_| self.action.clone())
        );
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
