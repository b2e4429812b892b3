//! Bucket engine: the check contract, its registry, results and fan-out helper

pub mod fanout;
pub mod registry;
pub mod results;

pub use registry::{BucketInfo, Buckets, Factory};
pub use results::{RenderOptions, Results, Value};

use crate::config::DEFAULT_OUTPUT_WIDTH;
use crate::error::{DigError, Result};
use async_trait::async_trait;
use kube::Client;

/// A bucket instance, created right before it runs and dropped right after
#[async_trait]
pub trait Bucket: Send + Sync {
    async fn run(&self) -> Result<Results>;
}

/// Per-invocation settings handed to every bucket factory
#[derive(Clone)]
pub struct Config {
    /// Cluster client, filled lazily the first time a bucket asks for it
    pub client: Option<Client>,
    pub namespace: String,
    pub color: bool,
    pub output_width: usize,
    pub admission_force: bool,
    pub admission_create: bool,
}

impl Config {
    /// The cluster client, or `MissingClient` so the orchestrator can bootstrap one
    pub fn client(&self) -> Result<Client> {
        self.client.clone().ok_or(DigError::MissingClient)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: None,
            namespace: String::new(),
            color: false,
            output_width: DEFAULT_OUTPUT_WIDTH,
            admission_force: false,
            admission_create: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client", &self.client.as_ref().map(|_| "<client>"))
            .field("namespace", &self.namespace)
            .field("color", &self.color)
            .field("output_width", &self.output_width)
            .field("admission_force", &self.admission_force)
            .field("admission_create", &self.admission_create)
            .finish()
    }
}
