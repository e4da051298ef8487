pub mod app;
pub mod config;
pub mod discovery;
mod infrastructure;
pub mod replay;

pub use infrastructure::k8s;
pub use infrastructure::kube_client;
pub use infrastructure::logging;
pub use infrastructure::metrics;
