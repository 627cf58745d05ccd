//! The logger actor.

use log::error;

use crate::actor::Role;
use crate::error::Result;
use crate::message::{LogDied, Note};
use crate::scene::Scene;

/// Stateless actor that prints crash reports to stderr.
///
/// Spawned by the stage at boot, before anything else. The exact report
/// format is not part of any contract. A logger failure is fatal and
/// propagates.
#[derive(Debug, Default)]
pub struct Logger;

impl Role for Logger {
    fn hear(&mut self, _scene: &Scene, note: Note) -> Result<()> {
        match note.downcast::<LogDied>() {
            Ok(report) => {
                error!("actor {} died: {}", report.who, report.corpse.reason);
                eprintln!(
                    "\x1b[1;31m======== actor {} died ========\x1b[0m",
                    report.who
                );
                eprintln!("{}", report.corpse.reason);
                match &report.corpse.backtrace {
                    Some(backtrace) => eprintln!("{backtrace}"),
                    None => eprintln!("note: run with RUST_BACKTRACE=1 for a backtrace"),
                }
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }
}
