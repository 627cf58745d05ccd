//! Ordered broadcast fan-out.

use crate::actor::Role;
use crate::error::Result;
use crate::id::Id;
use crate::message::{Note, Shout};
use crate::scene::Scene;

/// Actor that fans a shouted message out to a fixed list of members.
///
/// Delivery is in member order, one fresh copy each. This is also the seam
/// where remote delivery would plug in; the local runtime only ever fans
/// out to bound ids.
pub struct Troupe {
    members: Vec<Id>,
}

impl Troupe {
    /// Create a troupe over the given members.
    pub fn new(members: Vec<Id>) -> Self {
        Self { members }
    }
}

impl Role for Troupe {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        match note.downcast::<Shout>() {
            Ok(shout) => {
                for member in &self.members {
                    scene.say_note(member, (shout.copy)())?;
                }
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }
}
