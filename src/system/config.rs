//! Runtime configuration: defaults, overridden by `swarmrt.toml`, overridden
//! by `SWARMRT_`-prefixed environment variables. Grounded on the gossip
//! network example's figment layering.

use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// TLS material for the remote transport. Loading existing cert/key files
/// is in scope; generating them is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Trust anchor for verifying peers. `None` together with
    /// `insecure_skip_verify = true` accepts any peer certificate.
    pub ca_path: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// Supervisor health-probe timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(with = "crate::util::duration_serde")]
    pub health_interval: Duration,
    #[serde(with = "crate::util::duration_serde")]
    pub health_timeout: Duration,
    #[serde(with = "crate::util::duration_serde")]
    pub restart_quiescence: Duration,
    pub max_consecutive_failures: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            health_interval: Duration::from_secs(5),
            health_timeout: Duration::from_secs(3),
            restart_quiescence: Duration::from_millis(500),
            max_consecutive_failures: 2,
        }
    }
}

/// Orchestrated coordinator/aggregator/worker/evaluator protocol timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub worker_count: usize,
    pub auto_start: bool,
    pub max_rounds: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            auto_start: true,
            max_rounds: 20,
        }
    }
}

/// Autonomous gossip peer protocol timing and convergence thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GossipConfig {
    pub fanout: usize,
    #[serde(with = "crate::util::duration_serde")]
    pub gossip_interval: Duration,
    pub local_epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub convergence_eps: f32,
    pub convergence_patience: u32,
    pub max_rounds: u64,
    pub seed_peers: Vec<String>,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            fanout: 3,
            gossip_interval: Duration::from_secs(2),
            local_epochs: 1,
            batch_size: 32,
            learning_rate: 0.05,
            convergence_eps: 1e-3,
            convergence_patience: 5,
            max_rounds: 200,
            seed_peers: Vec::new(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_host: String,
    /// 0 lets the OS assign a port; the bound port is reported back via a
    /// `SystemEvent::ServerStarted`.
    pub bind_port: u16,
    pub mailbox_capacity: usize,
    pub tls: Option<TlsConfig>,
    pub supervisor: SupervisorConfig,
    pub coordinator: CoordinatorConfig,
    pub gossip: GossipConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 0,
            mailbox_capacity: crate::mailbox::DEFAULT_MAILBOX_CAPACITY,
            tls: None,
            supervisor: SupervisorConfig::default(),
            coordinator: CoordinatorConfig::default(),
            gossip: GossipConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load defaults, merge `swarmrt.toml` if present, then merge
    /// `SWARMRT_`-prefixed environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(RuntimeConfig::default()))
            .merge(Toml::file("swarmrt.toml"))
            .merge(Env::prefixed("SWARMRT_").split("_"))
            .extract()
            .map_err(ConfigError::from)
    }
}
