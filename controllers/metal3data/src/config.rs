//! Controller configuration read from the environment at start-up.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_REQUEUE_AFTER_SECONDS: u64 = 30;
const DEFAULT_RECONCILE_CONCURRENCY: u16 = 3;
const DEFAULT_DEBOUNCE_SECONDS: u64 = 1;
const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Runtime settings for the Metal3Data controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; all namespaces when `None`
    pub namespace: Option<String>,
    /// Delay before retrying a transient outcome
    pub requeue_after: Duration,
    pub concurrency: u16,
    pub debounce: Duration,
    pub metrics_bind_address: SocketAddr,
}

impl ControllerConfig {
    /// Load from `WATCH_NAMESPACE`, `REQUEUE_AFTER_SECONDS`,
    /// `RECONCILE_CONCURRENCY`, `DEBOUNCE_SECONDS` and `METRICS_BIND_ADDRESS`
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        let requeue_after: u64 = parse(&lookup, "REQUEUE_AFTER_SECONDS", DEFAULT_REQUEUE_AFTER_SECONDS)?;
        let concurrency: u16 = parse(&lookup, "RECONCILE_CONCURRENCY", DEFAULT_RECONCILE_CONCURRENCY)?;
        let debounce: u64 = parse(&lookup, "DEBOUNCE_SECONDS", DEFAULT_DEBOUNCE_SECONDS)?;
        let metrics_bind_address = match lookup("METRICS_BIND_ADDRESS") {
            Some(raw) => parse_value("METRICS_BIND_ADDRESS", &raw)?,
            None => parse_value("METRICS_BIND_ADDRESS", DEFAULT_METRICS_BIND_ADDRESS)?,
        };

        if requeue_after == 0 {
            return Err(ControllerError::InvalidConfig(
                "REQUEUE_AFTER_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            namespace,
            requeue_after: Duration::from_secs(requeue_after),
            concurrency,
            debounce: Duration::from_secs(debounce),
            metrics_bind_address,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ControllerError> {
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ControllerError> {
    raw.trim()
        .parse()
        .map_err(|_| ControllerError::InvalidConfig(format!("{} has invalid value {:?}", key, raw)))
}
