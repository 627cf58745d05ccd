//! Runtime message types.
//!
//! Messages travel as [`Note`]s: boxed, type-erased payloads. The runtime's
//! own messages are the small structs below; user messages are any
//! `Send + 'static` value. Receivers dispatch by downcast, which is how the
//! runtime renders shape dispatch: the per-actor loop peels off `Leave!`,
//! the stage peels off its registry messages, and everything else lands in
//! the actor's own `hear`.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use crate::actor::Role;
use crate::id::Id;

/// A type-erased message. Anything `Send + 'static` can be a note.
pub type Note = Box<dyn Any + Send>;

/// Seed message a freshly constructed stage sends itself; handling it
/// spawns the logger, the passive minder and the play.
pub(crate) struct PreGenesis {
    pub(crate) play: Box<dyn Role>,
    pub(crate) kind: &'static str,
}

/// First message every play receives once the stage has booted.
#[derive(Debug)]
pub struct Genesis;

/// Request to the stage to bring a new actor onto it.
///
/// Built by [`Scene::enter`](crate::Scene::enter) and
/// [`Scene::delegate`](crate::Scene::delegate); not constructed directly.
pub struct Enter {
    pub(crate) role: Box<dyn Role>,
    pub(crate) kind: &'static str,
    pub(crate) reply_to: Option<Id>,
}

/// Reply to [`Enter`], carrying the new actor's id.
///
/// Delivered to the requester, or to the new actor itself when the request
/// named no reply target.
#[derive(Debug, Clone)]
pub struct Entered(pub Id);

/// Normal-exit report: the named actor has left the stage.
#[derive(Debug, Clone)]
pub struct Left(pub Id);

/// Crash report delivered to an actor's minder.
#[derive(Debug, Clone)]
pub struct Died {
    /// The actor that crashed.
    pub who: Id,
    /// What killed it.
    pub corpse: Corpse,
}

/// Cooperative request to exit: the recipient closes its own inbox.
/// Sent to the stage, it shuts the whole system down.
#[derive(Debug, Clone)]
pub struct Leave;

/// Crash report formatted for the logger.
#[derive(Debug, Clone)]
pub struct LogDied {
    /// The actor that crashed.
    pub who: Id,
    /// What killed it.
    pub corpse: Corpse,
}

/// Broadcast envelope a troupe fans out to its members.
///
/// Carries a copy-maker instead of the message itself so the troupe needs
/// no knowledge of the concrete type.
pub(crate) struct Shout {
    pub(crate) copy: Box<dyn Fn() -> Note + Send>,
}

/// The remains of a crashed actor: why it died, and where.
#[derive(Debug, Clone)]
pub struct Corpse {
    /// Human-readable failure reason.
    pub reason: String,
    /// Backtrace captured at the point of death, when available.
    pub backtrace: Option<String>,
}

impl Corpse {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        let captured = Backtrace::capture();
        let backtrace = match captured.status() {
            BacktraceStatus::Captured => Some(captured.to_string()),
            _ => None,
        };
        Self {
            reason: reason.into(),
            backtrace,
        }
    }

    /// Build a corpse from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let reason = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "actor panicked".to_string()
        };
        Self::new(reason)
    }
}

// A corpse reads as its reason; the backtrace is for the logger to append.
impl fmt::Display for Corpse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpse_from_str_panic() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let corpse = Corpse::from_panic(payload.as_ref());
        assert_eq!(corpse.reason, "boom");
    }

    #[test]
    fn test_corpse_from_string_panic() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("kaput"));
        let corpse = Corpse::from_panic(payload.as_ref());
        assert_eq!(corpse.reason, "kaput");
    }

    #[test]
    fn test_corpse_from_opaque_panic() {
        let payload: Box<dyn Any + Send> = Box::new(17u32);
        let corpse = Corpse::from_panic(payload.as_ref());
        assert_eq!(corpse.reason, "actor panicked");
    }
}
