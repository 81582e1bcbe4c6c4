use slog::Drain;
use std::future::Future;
use std::time::Duration;

pub(crate) fn test_logger() -> slog::Logger {
    let decorator = slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();

    slog::Logger::root(drain, slog::o!())
}

/// Awaits `future`, panicking if it takes unreasonably long. Keeps a broken test from hanging.
pub(crate) async fn recv_with_sanity_timeout<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("Unexpected timeout")
}
