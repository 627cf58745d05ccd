//! The per-actor runtime record and dispatch loop.
//!
//! A [`Record`] is the registry's view of one actor: its mailbox, the task
//! bound to it, and its minder. The record deliberately owns no state and
//! no role; the role lives on the dispatcher's stack, so nothing outside
//! the owning task can ever reach it.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use log::{debug, error};
use parking_lot::Mutex;

use crate::actor::mailbox::Mailbox;
use crate::actor::Role;
use crate::error::Result;
use crate::id::Id;
use crate::message::{Corpse, Leave, Note};
use crate::scene::Scene;

/// Runtime record of one actor on a stage.
pub(crate) struct Record {
    num: u64,
    kind: &'static str,
    mailbox: Mailbox<Note>,
    owner: Mutex<Option<ThreadId>>,
    minder: Mutex<Option<Id>>,
    // Held for the data model's sake; nothing joins an actor task. The
    // grace timer bounds shutdown instead.
    #[allow(dead_code)]
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Record {
    pub(crate) fn new(num: u64, kind: &'static str, capacity: usize) -> Self {
        Self {
            num,
            kind,
            mailbox: Mailbox::new(capacity),
            owner: Mutex::new(None),
            minder: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub(crate) fn mailbox(&self) -> &Mailbox<Note> {
        &self.mailbox
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }

    pub(crate) fn minder(&self) -> Option<Id> {
        self.minder.lock().clone()
    }

    pub(crate) fn set_minder(&self, minder: Id) {
        *self.minder.lock() = Some(minder);
    }

    pub(crate) fn set_task(&self, handle: JoinHandle<()>) {
        *self.task.lock() = Some(handle);
    }

    /// Bind the current task to this actor. Exactly one task may ever be
    /// bound at a time; a second bind is a program bug.
    pub(crate) fn bind(&self) {
        let mut owner = self.owner.lock();
        assert!(
            owner.is_none(),
            "actor #{} is already bound to a task",
            self.num
        );
        *owner = Some(thread::current().id());
    }

    pub(crate) fn unbind(&self) {
        *self.owner.lock() = None;
    }

    /// Contract check: the caller must be the task bound to this actor.
    pub(crate) fn assert_owner(&self, operation: &str) {
        let owner = self.owner.lock();
        assert!(
            *owner == Some(thread::current().id()),
            "{} on actor #{} from a task that does not own it",
            operation,
            self.num
        );
    }
}

/// Drive one actor to completion on the current task.
///
/// Any failure in the prologue, a handler or the epilogue is caught exactly
/// once, reported through `dieing_breath`, and then re-raised so the task
/// dies failed. The inbox is closed on every exit path.
pub(crate) fn run(mut role: Box<dyn Role>, record: std::sync::Arc<Record>, scene: Scene) {
    record.bind();
    debug!("actor {} ({}) takes the stage", scene.me(), record.kind());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| drive(role.as_mut(), &record, &scene)));
    match outcome {
        Ok(Ok(())) => {
            record.mailbox().close();
            record.unbind();
            debug!("actor {} left the stage", scene.me());
        }
        Ok(Err(err)) => {
            let corpse = Corpse::new(err.to_string());
            role.dieing_breath(&scene, &corpse, scene.env());
            record.mailbox().close();
            record.unbind();
            error!(
                "actor {} ({}) died: {}",
                scene.me(),
                record.kind(),
                corpse.reason
            );
        }
        Err(payload) => {
            let corpse = Corpse::from_panic(payload.as_ref());
            role.dieing_breath(&scene, &corpse, scene.env());
            record.mailbox().close();
            record.unbind();
            error!(
                "actor {} ({}) died: {}",
                scene.me(),
                record.kind(),
                corpse.reason
            );
            panic::resume_unwind(payload);
        }
    }
}

fn drive(role: &mut dyn Role, record: &Record, scene: &Scene) -> Result<()> {
    role.prologue(scene, scene.env())?;
    while let Some(note) = record.mailbox().take() {
        if note.is::<Leave>() {
            role.on_leave(scene)?;
        } else {
            role.hear(scene, note)?;
        }
    }
    role.epilogue(scene, scene.env())
}
