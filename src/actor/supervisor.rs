//! Actor supervision and failure escalation.
//!
//! Minders receive the exit traffic of their wards: `Left!` for normal
//! exits and `Died!` for crashes. Supervision policy is just another actor,
//! so custom policies are written as ordinary roles; the default installed
//! at boot is the [`PassiveMinder`] here, whose policy is log-and-escalate.

use log::debug;

use crate::actor::Role;
use crate::error::Result;
use crate::id::Id;
use crate::message::{Died, Left, LogDied, Note};
use crate::scene::Scene;

/// The default minder: logs crashes and escalates them to the stage.
///
/// - `Left!` is no concern of supervision; it is ignored.
/// - `Died!` is formatted for the logger, then forwarded to the stage,
///   which shuts the system down. A failure to reach the logger is itself
///   fatal and propagates up the minder chain.
pub struct PassiveMinder {
    logger: Id,
}

impl PassiveMinder {
    /// Create a minder that reports through the given logger actor.
    pub fn new(logger: Id) -> Self {
        Self { logger }
    }
}

impl Role for PassiveMinder {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        let note = match note.downcast::<Left>() {
            Ok(left) => {
                debug!("minder watched {} leave", left.0);
                return Ok(());
            }
            Err(other) => other,
        };
        match note.downcast::<Died>() {
            Ok(died) => {
                let Died { who, corpse } = *died;
                scene.say(
                    &self.logger,
                    LogDied {
                        who: who.clone(),
                        corpse: corpse.clone(),
                    },
                )?;
                match scene.say(scene.stage(), Died { who, corpse }) {
                    // The stage closing first means shutdown is already
                    // underway; nothing left to escalate.
                    Err(err) if err.is_closed() => Ok(()),
                    other => other,
                }
            }
            Err(_) => Ok(()),
        }
    }
}
