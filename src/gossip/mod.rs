//! Peer gossip. Each configured peer gets a reconnecting bidirectional stream that carries local
//! transactions out and peer transactions in.

mod peer_session;
mod session;

pub use session::SessionError;

pub(crate) use peer_session::PeerSession;
pub(crate) use session::StreamSession;
