//! Per-actor execution context.
//!
//! A [`Scene`] is handed by reference to every handler invocation. It
//! bundles the subject's id, the stage's id and the captured environment,
//! and it carries the whole messaging API: [`say`](Scene::say),
//! [`ask`](Scene::ask), [`enter`](Scene::enter), [`leave`](Scene::leave),
//! [`delegate`](Scene::delegate) and [`shout`](Scene::shout).
//!
//! A scene belongs to its actor's task. Operations that reach into the
//! subject's own inbox or minder assert that the calling task is the one
//! bound to the actor and panic otherwise; that is a contract, not a debug
//! aid.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::actor::mailbox::TakeTimeout;
use crate::actor::Role;
use crate::cast::Stooge;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::message::{Corpse, Died, Enter, Entered, Left, Note, Shout};

/// Opaque per-actor environment captured at spawn.
///
/// Produced by the stage's environment hook (see
/// [`StageConfig::environment`](crate::StageConfig)), absent by default,
/// and identical for the whole life of each actor.
pub type Env = Option<Arc<dyn Any + Send + Sync>>;

/// Immutable context for one actor: who is running, and on which stage.
#[derive(Clone)]
pub struct Scene {
    me: Id,
    stage: Id,
    env: Env,
}

impl Scene {
    pub(crate) fn new(me: Id, stage: Id, env: Env) -> Self {
        Self { me, stage, env }
    }

    /// The subject: the actor currently running.
    pub fn me(&self) -> &Id {
        &self.me
    }

    /// The stage this actor lives on.
    pub fn stage(&self) -> &Id {
        &self.stage
    }

    /// The environment captured for this actor at spawn.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The subject's minder.
    ///
    /// # Panics
    ///
    /// When called from a task that does not own the subject.
    pub fn minder(&self) -> Id {
        let record = self.own_record();
        record.assert_owner("minder read");
        record.minder().expect("every actor on stage has a minder")
    }

    /// Re-point the subject's minder.
    ///
    /// # Panics
    ///
    /// When called from a task that does not own the subject.
    pub fn set_minder(&self, minder: Id) {
        let record = self.own_record();
        record.assert_owner("minder write");
        record.set_minder(minder);
    }

    /// Send a message to another actor's inbox, waiting while it is full.
    ///
    /// Fails descriptively for a remote id, and with a closed-mailbox error
    /// once the recipient is gone.
    pub fn say<M: Send + 'static>(&self, to: &Id, message: M) -> Result<()> {
        self.say_note(to, Box::new(message))
    }

    /// Send an already type-erased note.
    pub(crate) fn say_note(&self, to: &Id, note: Note) -> Result<()> {
        let record = to.record()?;
        record.mailbox().put(note).map_err(Error::from)
    }

    /// Synchronous request over asynchronous messaging.
    ///
    /// Sends `request` to `target`, then consumes the subject's own inbox
    /// until a note of type `R` arrives; that note is the reply. Every note
    /// consumed on the way is put back in front afterwards, so the inbox
    /// ends up exactly as if the ask had not happened, minus the reply.
    ///
    /// Asking oneself fails before sending: the reply could only be
    /// produced by the very handler that is blocked waiting for it.
    pub fn ask<R, M>(&self, target: &Id, request: M) -> Result<R>
    where
        R: Send + 'static,
        M: Send + 'static,
    {
        self.correlate(target, request, None)
    }

    /// [`ask`](Scene::ask) with a deadline on the reply.
    pub fn ask_within<R, M>(&self, target: &Id, request: M, deadline: Duration) -> Result<R>
    where
        R: Send + 'static,
        M: Send + 'static,
    {
        self.correlate(target, request, Some(deadline))
    }

    fn correlate<R, M>(&self, target: &Id, request: M, deadline: Option<Duration>) -> Result<R>
    where
        R: Send + 'static,
        M: Send + 'static,
    {
        if target == &self.me {
            return Err(Error::SelfAsk(self.me.clone()));
        }
        let record = self.own_record();
        record.assert_owner("ask");
        self.say(target, request)?;

        let expiry = deadline.map(|wait| Instant::now() + wait);
        let mut stash: VecDeque<Note> = VecDeque::new();
        let verdict = loop {
            let note = match expiry {
                None => match record.mailbox().take() {
                    Some(note) => note,
                    None => break Err(Error::AskInterrupted),
                },
                Some(at) => match record.mailbox().take_until(at) {
                    TakeTimeout::Note(note) => note,
                    TakeTimeout::Closed => break Err(Error::AskInterrupted),
                    TakeTimeout::Elapsed => {
                        break Err(Error::AskTimeout(deadline.unwrap_or_default()))
                    }
                },
            };
            match note.downcast::<R>() {
                Ok(reply) => break Ok(*reply),
                Err(other) => stash.push_back(other),
            }
        };
        // Restore what was consumed, even on failure: a closed inbox still
        // drains, and those notes belong to the subject.
        record.mailbox().requeue(stash);
        verdict
    }

    /// Bring a new actor onto the stage and return its id.
    ///
    /// Issues an `Enter!` ask to the stage; the stage forks a task for the
    /// new actor and answers `Entered!`.
    pub fn enter<R: Role>(&self, role: R) -> Result<Id> {
        let Entered(id) = self.ask(
            &self.stage,
            Enter {
                role: Box::new(role),
                kind: std::any::type_name::<R>(),
                reply_to: Some(self.me.clone()),
            },
        )?;
        Ok(id)
    }

    /// Close the subject's own inbox, requesting its graceful exit.
    ///
    /// Notes already admitted are still drained before the epilogue runs.
    ///
    /// # Panics
    ///
    /// When called from a task that does not own the subject.
    pub fn leave(&self) -> Result<()> {
        let record = self.own_record();
        record.assert_owner("leave");
        record.mailbox().close();
        Ok(())
    }

    /// Spawn a stooge: a one-shot actor that runs `action` and exits.
    ///
    /// Fire-and-forget; the `Enter!` names no reply target, so the stage
    /// hands `Entered!` to the stooge itself, which is its cue to perform.
    pub fn delegate<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce(&Scene) -> Result<()> + Send + 'static,
    {
        self.say(
            &self.stage,
            Enter {
                role: Box::new(Stooge::new(action)),
                kind: std::any::type_name::<Stooge>(),
                reply_to: None,
            },
        )
    }

    /// Broadcast a message through a troupe.
    ///
    /// Each member receives its own copy, in the troupe's member order.
    pub fn shout<M: Clone + Send + 'static>(&self, troupe: &Id, message: M) -> Result<()> {
        self.say(
            troupe,
            Shout {
                copy: Box::new(move || Box::new(message.clone()) as Note),
            },
        )
    }

    /// What the default epilogue does: report `Left!` to the stage.
    ///
    /// A stage that is already closed is no error here; the report only
    /// says what shutdown already knows.
    pub fn report_left(&self) -> Result<()> {
        match self.say(&self.stage, Left(self.me.clone())) {
            Err(err) if err.is_closed() => {
                debug!("left report from {} raced shutdown", self.me);
                Ok(())
            }
            other => other,
        }
    }

    /// What the default dieing breath does: report `Died!` to the minder.
    pub fn report_died(&self, corpse: &Corpse) {
        let minder = self.minder();
        let report = Died {
            who: self.me.clone(),
            corpse: corpse.clone(),
        };
        if let Err(err) = self.say(&minder, report) {
            if err.is_closed() {
                debug!("death report from {} raced shutdown", self.me);
            } else {
                warn!("could not report death of {}: {}", self.me, err);
            }
        }
    }

    fn own_record(&self) -> Arc<crate::actor::record::Record> {
        self.me
            .record()
            .expect("the subject of a live scene is always local")
    }
}
