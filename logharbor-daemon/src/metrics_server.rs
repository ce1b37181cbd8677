//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`
//! to expose the collector counters on `/metrics`.

use std::net::SocketAddr;

use anyhow::Result;
use logharbor_core::config::MetricsConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the global metrics recorder and start the HTTP listener.
///
/// This function should be called once per process. After it returns,
/// every `metrics::counter!()` / `metrics::gauge!()` call in the collector
/// is exported in Prometheus format.
///
/// # Errors
///
/// - The listen address does not parse
/// - Socket binding fails
/// - A global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = metrics_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    logharbor_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}

/// Resolve the metrics listen address from `listen_addr` and `port`.
pub fn metrics_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    let ip: std::net::IpAddr = config
        .listen_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address '{}': {}", config.listen_addr, e))?;
    Ok(SocketAddr::new(ip, config.port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_addr_accepts_ipv4_and_ipv6() {
        let mut config = MetricsConfig::default();
        assert_eq!(metrics_addr(&config).unwrap().to_string(), "127.0.0.1:9100");

        config.listen_addr = "::1".to_owned();
        config.port = 9200;
        assert_eq!(metrics_addr(&config).unwrap().to_string(), "[::1]:9200");
    }

    #[test]
    fn metrics_addr_rejects_hostname() {
        let config = MetricsConfig {
            listen_addr: "localhost".to_owned(),
            ..MetricsConfig::default()
        };
        assert!(metrics_addr(&config).is_err());
    }
}
