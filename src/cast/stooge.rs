//! One-shot closure actors.

use anyhow::anyhow;

use crate::actor::Role;
use crate::error::Result;
use crate::message::{Entered, Note};
use crate::scene::Scene;

type Action = Box<dyn FnOnce(&Scene) -> Result<()> + Send>;

/// Ephemeral actor that performs one closure and exits.
///
/// Created through [`Scene::delegate`](crate::Scene::delegate). Its cue is
/// the `Entered!` note the stage delivers when an `Enter!` request names no
/// reply target: on seeing its own entrance it runs the action, then closes
/// its inbox.
pub struct Stooge {
    action: Option<Action>,
}

impl Stooge {
    pub(crate) fn new<F>(action: F) -> Self
    where
        F: FnOnce(&Scene) -> Result<()> + Send + 'static,
    {
        Self {
            action: Some(Box::new(action)),
        }
    }
}

impl Role for Stooge {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        match note.downcast::<Entered>() {
            Ok(entered) if entered.0 == *scene.me() => {
                let action = self
                    .action
                    .take()
                    .ok_or_else(|| anyhow!("stooge already performed"))?;
                action(scene)?;
                scene.leave()
            }
            _ => Ok(()),
        }
    }
}
