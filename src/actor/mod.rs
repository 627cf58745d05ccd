//! Actor-based concurrency: behavior trait, mailbox, record and dispatch.
//!
//! An actor is an isolated unit of state and behavior owning one mailbox
//! and one task. The state is the [`Role`] implementation itself; it moves
//! into the actor's task at spawn and is never shared, so handlers get
//! `&mut self` and the single-writer rule holds by construction.

/// Bounded FIFO mailboxes with blocking put/take and observable close.
pub mod mailbox;

/// The actor record and the per-actor dispatch loop.
pub(crate) mod record;

/// The default supervision actor.
pub mod supervisor;

use crate::error::Result;
use crate::message::{Corpse, Note};
use crate::scene::{Env, Scene};

/// Behavior of one actor.
///
/// A role receives every message addressed to its actor, one at a time, in
/// mailbox order, always on the one task bound to the actor. The lifecycle
/// hooks run on that same task: `prologue` once before the first message,
/// then `hear` per message until the inbox closes, then `epilogue`; a panic
/// or error anywhere in between runs `dieing_breath` instead and the task
/// dies failed.
pub trait Role: Send + 'static {
    /// Handle one message.
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()>;

    /// Runs once before the first message. Default: nothing.
    fn prologue(&mut self, _scene: &Scene, _env: &Env) -> Result<()> {
        Ok(())
    }

    /// Runs once after the inbox has closed and drained.
    ///
    /// The default reports `Left!` to the stage so the registry forgets
    /// this actor.
    fn epilogue(&mut self, scene: &Scene, _env: &Env) -> Result<()> {
        scene.report_left()
    }

    /// Runs once when the actor is dying, before its task fails.
    ///
    /// The default reports `Died!` to the actor's minder.
    fn dieing_breath(&mut self, scene: &Scene, corpse: &Corpse, _env: &Env) {
        scene.report_died(corpse);
    }

    /// Reaction to a `Leave!` request, routed here by the dispatch loop
    /// before user dispatch. The default closes the actor's own inbox;
    /// messages already admitted are still drained before `epilogue`.
    fn on_leave(&mut self, scene: &Scene) -> Result<()> {
        scene.leave()
    }
}
