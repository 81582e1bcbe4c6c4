mod api;
mod engine;
mod fanout;
mod gossip;
mod server;
mod grpc {
    include!("../generated/replidoc.rs");
}
#[cfg(test)]
mod test_utils;

pub use api::try_create_node;
pub use api::try_create_node_with_patch_strategy;
pub use api::ClientError;
pub use api::DocClient;
pub use api::DocNode;
pub use api::InvalidPeerUri;
pub use api::NodeConfig;
pub use api::NodeCreationError;
pub use api::NodeOptions;
pub use api::RemoteSubscription;
pub use api::WriteError;
pub use engine::ApplyError;
pub use engine::JsonPatchStrategy;
pub use engine::PatchStrategy;
pub use engine::SubmitError;
pub use engine::Transaction;
pub use fanout::DropReason;
pub use fanout::SubscriberId;
pub use fanout::Subscription;
pub use gossip::SessionError;

// `crate::{root_mod}` should not have any code. Just `mod` and `pub use` statements, and only
// `pub use` decides what the rest of the world sees.
