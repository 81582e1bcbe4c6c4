//! The apply engine: dedup, ordered patch application, the in-memory write-ahead log and the
//! per-source sequence table.

mod admission;
mod apply_engine;
mod intake;
mod patch;
mod sequence_table;
mod state;
mod transaction;

pub use intake::SubmitError;
pub use patch::ApplyError;
pub use patch::JsonPatchStrategy;
pub use patch::PatchStrategy;
pub use transaction::Transaction;

pub(crate) use admission::LocalAdmission;
pub(crate) use apply_engine::ApplyEngine;
pub(crate) use intake::IntakeClient;
pub(crate) use state::SharedEngineState;

use crate::fanout::{self, FanoutTask};

/// Everything the engine needs, connected but not yet running. The caller spawns
/// `apply_engine.run()` and `fanout_task.run()`.
pub(crate) struct EngineParts<P: PatchStrategy> {
    pub(crate) apply_engine: ApplyEngine<P>,
    pub(crate) fanout_task: FanoutTask,
    pub(crate) intake: IntakeClient,
    pub(crate) state: SharedEngineState,
}

pub(crate) fn wired<P: PatchStrategy>(
    logger: slog::Logger,
    patch_strategy: P,
    intake_queue_capacity: usize,
    subscriber_queue_capacity: usize,
) -> EngineParts<P> {
    let (publisher, fanout_task) = fanout::wired(
        logger.new(slog::o!("component" => "fanout")),
        subscriber_queue_capacity,
    );
    let state = SharedEngineState::new(publisher);
    let (intake, receiver) = intake::create(intake_queue_capacity);
    let apply_engine = ApplyEngine::new(
        logger.new(slog::o!("component" => "engine")),
        receiver,
        state.clone(),
        patch_strategy,
    );

    EngineParts {
        apply_engine,
        fanout_task,
        intake,
        state,
    }
}
