//! Stage configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::actor::mailbox::DEFAULT_MAILBOX_CAPACITY;
use crate::id::Id;
use crate::scene::Env;

/// Hook producing the opaque environment captured for each actor at spawn.
pub type EnvHook = Arc<dyn Fn(&Id) -> Env + Send + Sync>;

/// Configuration for a stage.
#[derive(Clone)]
pub struct StageConfig {
    /// Capacity of every mailbox on this stage.
    ///
    /// This is backpressure policy: a sender to a full mailbox blocks until
    /// the owner drains a slot or the mailbox closes.
    pub mailbox_capacity: usize,

    /// How long a graceful shutdown waits for children to drain before the
    /// stage closes its own inbox and abandons them.
    pub shutdown_grace: Duration,

    /// Environment hook, called once per actor at spawn with the stage's
    /// id. The returned value rides on that actor's scene for life.
    /// Absent by default.
    pub environment: Option<EnvHook>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            shutdown_grace: Duration::from_secs(1),
            environment: None,
        }
    }
}

impl fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageConfig")
            .field("mailbox_capacity", &self.mailbox_capacity)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("environment", &self.environment.is_some())
            .finish()
    }
}
