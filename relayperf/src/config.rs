//! Environment-driven configuration for the harness.
//!
//! All values are read-only inputs to the engine; none of the formats here
//! are owned by it. Every setting has a default so a bare environment still
//! produces a usable configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use relayperf_core::{LoadOptions, PollSettings};

fn env_str(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_u64(value: Option<&str>, default: u64) -> u64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_f64(value: Option<&str>, default: f64) -> f64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no"
        ),
        None => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    parse_u64(env_opt(name).as_deref(), default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    parse_f64(env_opt(name).as_deref(), default)
}

fn env_bool(name: &str, default: bool) -> bool {
    parse_bool(env_opt(name).as_deref(), default)
}

/// A named remote/local AE title pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub remote_ae_title: String,
    pub local_ae_title: String,
}

/// Parses `ROUTES`-style values: `name=REMOTE/LOCAL,name2=REMOTE2/LOCAL2`.
/// Entries without both AE titles are skipped.
fn parse_routes(raw: Option<&str>) -> BTreeMap<String, Route> {
    let mut routes = BTreeMap::new();
    let Some(raw) = raw else {
        return routes;
    };

    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((name, pair)) = entry.split_once('=') else {
            continue;
        };
        let Some((remote, local)) = pair.split_once('/') else {
            continue;
        };
        let (name, remote, local) = (name.trim(), remote.trim(), local.trim());
        if name.is_empty() || remote.is_empty() || local.is_empty() {
            continue;
        }
        routes.insert(
            name.to_string(),
            Route {
                remote_ae_title: remote.to_string(),
                local_ae_title: local.to_string(),
            },
        );
    }
    routes
}

/// Where to send: the appliance's listener plus the AE identities used to
/// address both ends of an association.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub remote_ae_title: String,
    pub local_ae_title: String,
    /// Named alternative routes; `ACTIVE_ROUTE` selects one of these over
    /// the default AE titles.
    pub routes: BTreeMap<String, Route>,
}

impl Endpoint {
    pub fn from_env() -> Self {
        let routes = parse_routes(env_opt("ROUTES").as_deref());
        let active = env_opt("ACTIVE_ROUTE");

        let (remote_ae_title, local_ae_title) = match active.as_deref().and_then(|n| routes.get(n))
        {
            Some(route) => {
                tracing::debug!(route = active.as_deref(), "using named route");
                (route.remote_ae_title.clone(), route.local_ae_title.clone())
            }
            None => (
                env_str("ROUTER_AE_TITLE", "ROUTER"),
                env_str("LOCAL_AE_TITLE", "PERF_SENDER"),
            ),
        };

        Self {
            host: env_str("ROUTER_HOST", "127.0.0.1"),
            port: env_u64("ROUTER_PORT", 11112).min(u16::MAX as u64) as u16,
            remote_ae_title,
            local_ae_title,
            routes,
        }
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }
}

/// How hard to push: target rate, duration and worker concurrency.
#[derive(Debug, Clone, Copy)]
pub struct LoadProfile {
    pub peak_images_per_second: u64,
    pub load_multiplier: f64,
    pub test_duration_seconds: u64,
    pub concurrency: usize,
}

impl LoadProfile {
    pub fn from_env() -> Self {
        Self {
            peak_images_per_second: env_u64("PEAK_IMAGES_PER_SECOND", 50),
            load_multiplier: env_f64("LOAD_MULTIPLIER", 3.0),
            test_duration_seconds: env_u64("TEST_DURATION_SECONDS", 300),
            concurrency: env_u64("LOAD_CONCURRENCY", 8) as usize,
        }
    }

    /// Derived target aggregate rate in images/sec. A zero peak (or a
    /// non-positive multiplier) means unlimited: no pacing at all.
    pub fn rate_target(&self) -> Option<f64> {
        let rate = self.peak_images_per_second as f64 * self.load_multiplier;
        (rate > 0.0).then_some(rate)
    }

    pub fn options(&self) -> LoadOptions {
        LoadOptions {
            duration: Duration::from_secs(self.test_duration_seconds),
            concurrency: self.concurrency,
            rate_target: self.rate_target(),
        }
    }
}

/// Arrival-verification settings.
#[derive(Debug, Clone, Copy)]
pub struct VerifySettings {
    pub enabled: bool,
    pub timeout_seconds: u64,
    pub poll_interval_seconds: f64,
    /// Grace period before the first query, giving the appliance time to
    /// ingest.
    pub initial_delay_seconds: f64,
}

impl VerifySettings {
    pub fn from_env() -> Self {
        Self {
            enabled: env_bool("VERIFY_ENABLED", true),
            timeout_seconds: env_u64("VERIFY_TIMEOUT_SECONDS", 60),
            poll_interval_seconds: env_f64("VERIFY_POLL_INTERVAL_SECONDS", 5.0),
            initial_delay_seconds: env_f64("VERIFY_INITIAL_DELAY_SECONDS", 5.0),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            timeout: Duration::from_secs(self.timeout_seconds),
            poll_interval: Duration::from_secs_f64(self.poll_interval_seconds.max(0.0)),
        }
    }
}

/// Pass/fail acceptance criteria evaluated against a metrics snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub max_error_rate: f64,
    /// p95 bound for sustained (stability) runs.
    pub max_p95_latency_ms: f64,
    /// Tighter p95 bound for short throughput runs.
    pub max_p95_latency_ms_short: f64,
}

impl Thresholds {
    pub fn from_env() -> Self {
        Self {
            max_error_rate: env_f64("MAX_ERROR_RATE", 0.02),
            max_p95_latency_ms: env_f64("MAX_P95_LATENCY_MS", 2000.0),
            max_p95_latency_ms_short: env_f64("MAX_P95_LATENCY_MS_SHORT", 1500.0),
        }
    }
}

/// Master configuration: one call loads every setting the harness needs.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub endpoint: Endpoint,
    pub load_profile: LoadProfile,
    pub verify: VerifySettings,
    pub thresholds: Thresholds,
}

impl HarnessConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: Endpoint::from_env(),
            load_profile: LoadProfile::from_env(),
            verify: VerifySettings::from_env(),
            thresholds: Thresholds::from_env(),
        }
    }
}
