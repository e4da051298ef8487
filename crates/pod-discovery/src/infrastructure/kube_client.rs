//! Kubernetes client construction for the section watchers.
//!
//! An explicit kubeconfig path wins. Without one the client is inferred from
//! the environment: the in-cluster service account first, then
//! `~/.kube/config`.

use std::path::Path;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;

use crate::infrastructure::k8s::KubernetesError;

/// Builds the client shared by every section watcher.
///
/// # Errors
///
/// - [`KubernetesError::ConnectionFailed`] if no configuration can be loaded
///   or the client cannot be built from it
pub async fn init_kube_client(
    kubeconfig: Option<PathBuf>,
) -> Result<Client, Report<KubernetesError>> {
    let config = match kubeconfig.as_deref() {
        Some(path) => config_from_file(path).await?,
        None => Config::infer()
            .await
            .change_context_lazy(|| connection_failed("no in-cluster or local kubeconfig found"))?,
    };
    tracing::debug!(cluster = %config.cluster_url, "using Kubernetes API server");

    Client::try_from(config)
        .change_context_lazy(|| connection_failed("cannot build Kubernetes client"))
}

async fn config_from_file(path: &Path) -> Result<Config, Report<KubernetesError>> {
    let kubeconfig = Kubeconfig::read_from(path).change_context_lazy(|| {
        connection_failed(format!("cannot read kubeconfig {}", path.display()))
    })?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .change_context_lazy(|| {
            connection_failed(format!("invalid kubeconfig {}", path.display()))
        })
}

fn connection_failed(message: impl Into<String>) -> KubernetesError {
    KubernetesError::ConnectionFailed {
        message: message.into(),
    }
}
