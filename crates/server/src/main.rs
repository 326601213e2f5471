//! Waypoint MCP server: geospatial API operations as agent tools over stdio.
//!
//! Startup wires the pieces together once: CLI config → policy pipeline →
//! tool registry → MCP stdio service. Tools receive the bound pipeline at
//! construction; nothing here mutates global transport state.

mod cli;
mod server;

use anyhow::Context as _;
use clap::Parser;
use cli::Cli;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waypoint_geo_tools::{GeoApi, GeoApiConfig, ToolRegistry};
use waypoint_pipeline::{LogSink, Pipeline, ReqwestTransport, TraceSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the MCP protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    let pipeline_config = cli.pipeline_config();

    let transport = Arc::new(ReqwestTransport::new(Some(pipeline_config.request_timeout)));
    let sink: Option<Arc<dyn TraceSink>> = pipeline_config
        .tracing_enabled
        .then(|| Arc::new(LogSink) as Arc<dyn TraceSink>);
    let pipeline = Arc::new(Pipeline::standard(&pipeline_config, transport, sink));

    let api_config =
        GeoApiConfig::new(&cli.base_url, cli.api_key.clone()).context("remote API config")?;
    let registry = ToolRegistry::standard(Arc::new(GeoApi::new(api_config, pipeline)))
        .filtered(cli.enable_tools.as_deref(), &cli.disable_tools)
        .context("tool filter")?;

    tracing::info!(
        base_url = %cli.base_url,
        tools = ?registry.names(),
        tracing_enabled = pipeline_config.tracing_enabled,
        "starting waypoint MCP server on stdio"
    );

    let service = server::WaypointServer::new(Arc::new(registry))
        .serve(stdio())
        .await
        .context("start MCP stdio service")?;
    service.waiting().await.context("MCP service terminated")?;

    Ok(())
}
