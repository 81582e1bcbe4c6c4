//! This mod is meant to hold most of the code for the library's client-facing API.
mod client;
mod node;
mod options;
mod wiring;

pub use client::ClientError;
pub use client::DocClient;
pub use client::RemoteSubscription;
pub use node::DocNode;
pub use node::WriteError;
pub use options::NodeOptions;
pub use wiring::try_create_node;
pub use wiring::try_create_node_with_patch_strategy;
pub use wiring::InvalidPeerUri;
pub use wiring::NodeConfig;
pub use wiring::NodeCreationError;
