use chrono::{DateTime, Datelike, Duration as ChronoDuration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::host::HealthReport;

/// Retention used when a tenant configures `0`: one hundred years.
pub const NEVER_EXPIRE: ChronoDuration = ChronoDuration::days(365 * 100);

/// Decides whether a response code counts as a server error.
///
/// The default, [`ServerErrorPredicate::ABOVE_OK`], flags every code above
/// 200, including redirects and client errors. It is kept as the default so
/// stored analytics stay comparable; pick [`ServerErrorPredicate::HTTP_ERROR`]
/// to flag only 4xx and 5xx.
#[derive(Clone, Copy)]
pub struct ServerErrorPredicate(pub fn(u16) -> bool);

impl ServerErrorPredicate {
    pub const ABOVE_OK: Self = Self(above_ok);
    pub const HTTP_ERROR: Self = Self(http_error);

    pub fn is_server_error(&self, code: u16) -> bool {
        (self.0)(code)
    }
}

fn above_ok(code: u16) -> bool {
    code > 200
}

fn http_error(code: u16) -> bool {
    code >= 400
}

impl Default for ServerErrorPredicate {
    fn default() -> Self {
        Self::ABOVE_OK
    }
}

impl std::fmt::Debug for ServerErrorPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServerErrorPredicate")
    }
}

/// Durable analytics entry for one health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeRecord {
    pub url: String,
    /// Probe latency in milliseconds.
    pub request_time: i64,
    pub response_code: u16,
    pub tcp_error: bool,
    pub server_error: bool,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    /// When the record was built, not when the probe ran.
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "expireAt")]
    pub expire_at: DateTime<Utc>,
    pub api_id: String,
    pub org_id: String,
}

impl UptimeRecord {
    /// Build a record from a report at `now`. The expiry is left at `now`
    /// until [`UptimeRecord::set_expiry`] is called.
    pub fn from_report(
        report: &HealthReport,
        org_id: impl Into<String>,
        predicate: ServerErrorPredicate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            url: report.check_url.clone(),
            request_time: i64::try_from(report.latency.as_millis()).unwrap_or(i64::MAX),
            response_code: report.response_code,
            tcp_error: report.is_tcp_error,
            server_error: predicate.is_server_error(report.response_code),
            day: now.day(),
            month: now.month(),
            year: now.year(),
            hour: now.hour(),
            timestamp: now,
            expire_at: now,
            api_id: report.tenant_id().to_string(),
            org_id: org_id.into(),
        }
    }

    /// Expire `expires_in_secs` after the record timestamp; `0` means never.
    ///
    /// Retentions past the representable calendar clamp to the never-expire
    /// horizon.
    pub fn set_expiry(&mut self, expires_in_secs: i64) {
        let never = self
            .timestamp
            .checked_add_signed(NEVER_EXPIRE)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.expire_at = if expires_in_secs == 0 {
            never
        } else {
            ChronoDuration::try_seconds(expires_in_secs)
                .and_then(|retention| self.timestamp.checked_add_signed(retention))
                .unwrap_or(never)
        };
    }

    /// MessagePack with named fields, for appending to the analytics
    /// collection.
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| PulseError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| PulseError::Serialization(e.to_string()))
    }
}
