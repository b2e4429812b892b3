//! Kubernetes client bootstrap

use crate::error::{DigError, Result};
use async_trait::async_trait;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable the kubelet always exports into containers
pub const KUBERNETES_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";

/// Mount point of the service account, the same path kube's in-cluster config reads
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Namespace file of the mounted service account
pub const SERVICE_ACCOUNT_NAMESPACE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Whether we seem to run inside a pod.
///
/// Service environment variables can be disabled with `enableServiceLinks`
/// but the API server ones are always exported, which makes this a cheap and
/// stable heuristic. It can be fooled by editing the environment.
pub fn is_in_cluster() -> bool {
    std::env::var_os(KUBERNETES_HOST_ENV).is_some()
}

/// Create a Kubernetes client from an explicit kubeconfig, the in-cluster
/// service account, or the default kubeconfig, in that order
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let config = load_config(kubeconfig, context).await?;
    Client::try_from(config).map_err(DigError::from)
}

/// Load Kubernetes configuration
async fn load_config(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Config> {
    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| DigError::Config(format!("Failed to read kubeconfig: {e}")))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| DigError::Config(format!("Failed to load kubeconfig: {e}")))
        }
        None if is_in_cluster() && context.is_none() => {
            debug!("using in-cluster configuration");
            Config::incluster()
                .map_err(|e| DigError::Config(format!("Failed to load in-cluster config: {e}")))
        }
        None => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| DigError::Config(format!("Failed to load kubeconfig: {e}"))),
    }
}

/// Resolve the namespace of the active context.
///
/// Inside a pod this is the service account namespace, otherwise the
/// namespace of the selected (or current) kubeconfig context, falling back
/// to `default` when the context has none.
pub fn current_namespace(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<String> {
    if kubeconfig.is_none() && context.is_none() && is_in_cluster() {
        let namespace = std::fs::read_to_string(SERVICE_ACCOUNT_NAMESPACE)?;
        return Ok(namespace.trim().to_string());
    }

    let kubeconfig = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path),
        None => Kubeconfig::read(),
    }
    .map_err(|e| DigError::Config(format!("Failed to read kubeconfig: {e}")))?;

    namespace_from_kubeconfig(&kubeconfig, context)
}

/// Namespace of a context inside an already parsed kubeconfig
pub fn namespace_from_kubeconfig(kubeconfig: &Kubeconfig, context: Option<&str>) -> Result<String> {
    let name = context
        .map(String::from)
        .or_else(|| kubeconfig.current_context.clone())
        .ok_or_else(|| DigError::Config("No context specified and no current context in kubeconfig".to_string()))?;

    let named = kubeconfig
        .contexts
        .iter()
        .find(|ctx| ctx.name == name)
        .ok_or_else(|| DigError::Config(format!("Context not found: {name}")))?;

    Ok(named
        .context
        .as_ref()
        .and_then(|c| c.namespace.clone())
        .unwrap_or_else(|| "default".to_string()))
}

/// Lazily constructs the cluster client for buckets that need one
#[async_trait]
pub trait ClientBootstrap: Send + Sync {
    /// Build a client and resolve the namespace it should work in
    async fn bootstrap(&self) -> Result<(Client, String)>;
}

/// Bootstrap from ambient credentials
#[derive(Debug, Clone, Default)]
pub struct KubeBootstrap {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

#[async_trait]
impl ClientBootstrap for KubeBootstrap {
    async fn bootstrap(&self) -> Result<(Client, String)> {
        let namespace = match &self.namespace {
            Some(ns) => ns.clone(),
            None => current_namespace(self.kubeconfig.as_deref(), self.context.as_deref())?,
        };
        let client = create_client(self.kubeconfig.as_deref(), self.context.as_deref()).await?;
        debug!(namespace = %namespace, "cluster client ready");
        Ok((client, namespace))
    }
}
