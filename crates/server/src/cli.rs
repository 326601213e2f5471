//! CLI flags: the configuration surface read once at startup.

use clap::Parser;
use std::time::Duration;
use waypoint_pipeline::{PipelineConfig, RetryConfig};

const PRODUCT: &str = "waypoint-mcp";

#[derive(Debug, Parser)]
#[command(
    name = "waypoint-mcp-server",
    version,
    about = "MCP server exposing geospatial API operations as agent tools"
)]
pub struct Cli {
    /// Subscription key for the remote geospatial API.
    #[arg(long, env = "WAYPOINT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the remote geospatial API.
    #[arg(
        long,
        env = "WAYPOINT_BASE_URL",
        default_value = "https://atlas.microsoft.com"
    )]
    pub base_url: String,

    /// Per-attempt request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Total attempts per call, including the initial one.
    #[arg(long, default_value_t = 3)]
    pub retry_attempts: u32,

    /// Backoff floor in milliseconds.
    #[arg(long, default_value_t = 200)]
    pub retry_min_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub retry_max_delay_ms: u64,

    /// Disable span capture for outbound calls.
    #[arg(long)]
    pub no_tracing: bool,

    /// Comma-separated tool names to expose (default: all).
    #[arg(long, value_delimiter = ',')]
    pub enable_tools: Option<Vec<String>>,

    /// Comma-separated tool names to hide.
    #[arg(long, value_delimiter = ',')]
    pub disable_tools: Vec<String>,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            product: PRODUCT.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            retry: RetryConfig {
                max_attempts: self.retry_attempts,
                min_delay: Duration::from_millis(self.retry_min_delay_ms),
                max_delay: Duration::from_millis(self.retry_max_delay_ms),
            },
            request_timeout: Duration::from_secs(self.timeout_secs),
            tracing_enabled: !self.no_tracing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_configuration() {
        let cli = Cli::try_parse_from(["waypoint-mcp-server", "--api-key", "k"]).expect("parse");
        let config = cli.pipeline_config();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.min_delay, Duration::from_millis(200));
        assert_eq!(config.retry.max_delay, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.tracing_enabled);
        assert_eq!(cli.base_url, "https://atlas.microsoft.com");
    }

    #[test]
    fn tool_filters_split_on_commas() {
        let cli = Cli::try_parse_from([
            "waypoint-mcp-server",
            "--api-key",
            "k",
            "--enable-tools",
            "geocode_address,reverse_geocode",
            "--disable-tools",
            "route_directions",
            "--no-tracing",
        ])
        .expect("parse");
        assert_eq!(
            cli.enable_tools.as_deref(),
            Some(["geocode_address".to_string(), "reverse_geocode".to_string()].as_slice())
        );
        assert_eq!(cli.disable_tools, vec!["route_directions".to_string()]);
        assert!(!cli.pipeline_config().tracing_enabled);
    }

    #[test]
    fn api_key_is_required() {
        // No flag and no env var (cleared for the assertion).
        let err = Cli::try_parse_from(["waypoint-mcp-server"]);
        if std::env::var("WAYPOINT_API_KEY").is_err() {
            assert!(err.is_err());
        }
    }
}
