use core::error::Error;

/// Errors that can occur while talking to the Kubernetes API.
#[derive(Debug, derive_more::Display)]
pub enum KubernetesError {
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Failed to watch pods: {message}")]
    WatchFailed { message: String },
}

impl Error for KubernetesError {}
