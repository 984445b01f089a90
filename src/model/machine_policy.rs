use serde::{Deserialize, Serialize};

use crate::client::Collection;

/// Health check, connectivity and update settings applied to machines. Read only.
///
/// Timeouts arrive as .NET `TimeSpan` strings such as `00:01:00` or `1.00:00:00`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MachinePolicy {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub connection_connect_timeout: Option<String>,
    #[serde(default)]
    pub connection_retry_count_limit: i64,
    #[serde(default)]
    pub connection_retry_sleep_interval: Option<String>,
    #[serde(default)]
    pub connection_retry_time_limit: Option<String>,
    #[serde(default)]
    pub polling_request_queue_timeout: Option<String>,
    #[serde(default)]
    pub polling_request_maximum_message_processing_timeout: Option<String>,
    #[serde(default)]
    pub space_id: Option<String>,
}

impl Collection for MachinePolicy {
    const PATH: &'static str = "machinepolicies";
}

/// Nanoseconds in a `[d.]hh:mm:ss[.fffffff]` span. `None` when the text is not a span.
pub fn timespan_nanos(span: &str) -> Option<i64> {
    let (days, clock) = match span.split_once('.') {
        Some((days, rest)) if !days.contains(':') => (days.parse::<i64>().ok()?, rest),
        _ => (0, span),
    };
    let mut parts = clock.splitn(3, ':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    let whole = ((days * 24 + hours) * 60 + minutes) * 60;
    Some(whole * 1_000_000_000 + (seconds * 1e9).round() as i64)
}
