use core::error::Error;

/// Errors raised by the discovery core.
#[derive(Debug, derive_more::Display)]
pub enum DiscoveryError {
    #[display("cannot unmarshal {kind} from {payload}")]
    Decode { kind: &'static str, payload: String },
    #[display("event channel for section {section} is closed")]
    ChannelClosed { section: String },
}

impl Error for DiscoveryError {}
