//! LogHawk Collector - Main Entry Point
//!
//! One instance per node. Tails the configured log roots, classifies new
//! lines by severity, and ships them to the cloud server every poll cycle.

mod constants;
mod logic;

use logic::cloud_sync::{CloudClient, CloudConfig};
use logic::collect_loop::CollectLoop;
use logic::config::CollectorConfig;
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting LogHawk Collector v{}...", constants::APP_VERSION);

    let config = CollectorConfig::from_env();
    log::info!("  Node: {}", config.node_name);
    log::info!("  Server: {}", config.server_url);
    log::info!("  Poll interval: {}s", config.poll_interval_secs);
    for root in &config.log_roots {
        log::info!("  Log root: {}", root.display());
    }

    // Fatal: never classify without both keyword tiers defined.
    let rules = match config.load_rules() {
        Ok(rules) => rules,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };
    log::info!(
        "Severity rules loaded: {} error / {} warn keywords",
        rules.error.len(),
        rules.warn.len()
    );

    let cloud_config = CloudConfig {
        server_url: config.server_url.clone(),
        agent_key: config.agent_key.clone(),
        timeout_seconds: config.upload_timeout_secs,
    };
    let mut client = CloudClient::new(cloud_config, config.node_name.clone());

    match client.health_check().await {
        Ok(health) => log::info!("Cloud server healthy: v{}", health.version),
        Err(e) => log::warn!("Cloud server not reachable yet: {}", e),
    }

    // Registration resets this node's namespace and records init time.
    // Keep trying until the server is reachable; nothing can be uploaded
    // before a token is issued anyway.
    loop {
        match client.register().await {
            Ok(resp) => {
                log::info!("Registered with cloud server (server time: {})", resp.server_time);
                break;
            }
            Err(e) => {
                log::warn!("Cloud server not ready: {} - retrying in 5s", e);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }

    CollectLoop::new(&config, rules, client).run().await;
}
