use clap::{Args, Parser, ValueEnum};
use time::UtcOffset;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "NIDO_DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub messaging: MessagingConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "NIDO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the application API
    #[arg(long, env = "NIDO_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management API (health, release trigger)
    #[arg(long, env = "NIDO_MGMT_PORT", default_value_t = 3001)]
    pub mgmt_port: u16,

    /// How long to wait for background tasks on shutdown
    #[arg(long, env = "NIDO_SHUTDOWN_TIMEOUT_SECS", default_value_t = 30)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret key for verifying portal JWTs
    #[arg(long, env = "NIDO_JWT_SECRET")]
    pub jwt_secret: String,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed for standard endpoints
    #[arg(long, env = "NIDO_RATE_LIMIT_PER_SECOND", default_value_t = 10)]
    pub per_second: u32,

    /// Burst allowance for standard endpoints
    #[arg(long, env = "NIDO_RATE_LIMIT_BURST", default_value_t = 20)]
    pub burst: u32,

    /// Stricter rate limit for message sends
    #[arg(long, env = "NIDO_SEND_RATE_LIMIT_PER_SECOND", default_value_t = 2)]
    pub send_per_second: u32,

    /// Burst allowance for message sends
    #[arg(long, env = "NIDO_SEND_RATE_LIMIT_BURST", default_value_t = 5)]
    pub send_burst: u32,
}

#[derive(Clone, Debug, Args)]
pub struct MessagingConfig {
    /// UTC offset of the organization's wall clock, e.g. "+02:00"
    #[arg(long, env = "NIDO_ORG_UTC_OFFSET", default_value = "+00:00", value_parser = parse_utc_offset)]
    pub org_utc_offset: UtcOffset,

    /// How often to run the queued-message release sweep
    #[arg(long, env = "NIDO_RELEASE_INTERVAL_SECS", default_value_t = 3600)]
    pub release_interval_secs: u64,

    /// Maximum number of messages returned per conversation fetch
    #[arg(long, env = "NIDO_CONVERSATION_BATCH_LIMIT", default_value_t = 50)]
    pub conversation_batch_limit: i64,

    /// Bearer secret required by the external release trigger; unset allows
    /// unauthenticated triggering (development only)
    #[arg(long, env = "NIDO_RELEASE_SECRET")]
    pub release_secret: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP endpoint for traces and metrics; telemetry export is disabled
    /// when unset
    #[arg(long, env = "NIDO_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "NIDO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

fn parse_utc_offset(s: &str) -> Result<UtcOffset, String> {
    let err = || format!("invalid UTC offset '{s}', expected +HH:MM or -HH:MM");

    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1i8, rest),
        Some(("-", rest)) => (-1i8, rest),
        _ => return Err(err()),
    };
    let (h, m) = rest.split_once(':').ok_or_else(err)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(err());
    }
    let hours: i8 = h.parse().map_err(|_| err())?;
    let minutes: i8 = m.parse().map_err(|_| err())?;

    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| err())
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+00:00").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_utc_offset("+02:00").unwrap(), UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(parse_utc_offset("-05:30").unwrap(), UtcOffset::from_hms(-5, -30, 0).unwrap());
        assert!(parse_utc_offset("02:00").is_err());
        assert!(parse_utc_offset("+2:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }
}
