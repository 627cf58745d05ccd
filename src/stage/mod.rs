//! The stage: registry and root of one actor system.
//!
//! The stage is itself an actor, with identifier `0`, serving as the
//! registry of everything alive on it. It spawns actors (`Enter!`), tracks
//! membership (`Left!`), escalates crashes into shutdown (`Died!`) and
//! orchestrates graceful shutdown (`Leave!`). Its dispatcher is sticky: it
//! runs pinned on the thread that called [`play`], because the stage
//! initializes itself before anything else is scheduled.
//!
//! Boot sequence: a fresh stage seeds its own inbox with a `PreGenesis!`
//! note; handling it spawns the [`Logger`], spawns a [`PassiveMinder`]
//! wired to that logger, installs the minder as the stage's own minder,
//! spawns the user's play and sends it `Genesis!`.

mod shutdown;

use std::any::type_name;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use anyhow::anyhow;
use log::{debug, error, info, warn};

use crate::actor::record::{self, Record};
use crate::actor::supervisor::PassiveMinder;
use crate::actor::Role;
use crate::cast::Logger;
use crate::config::StageConfig;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::message::{Corpse, Died, Enter, Entered, Genesis, Leave, Left, Note, PreGenesis};
use crate::scene::{Env, Scene};
use self::shutdown::ShutdownTimer;

/// The root registry actor of one actor system.
///
/// Constructed by [`genesis`]; never instantiated directly.
pub struct Stage {
    children: HashMap<u64, Arc<Record>>,
    // Identifiers are never reused, so a late Left! can never evict a
    // newer actor that happened to land in the same registry slot.
    next_num: u64,
    timer: Option<ShutdownTimer>,
    play: Option<Id>,
    config: StageConfig,
}

impl Stage {
    fn new(config: StageConfig) -> Self {
        Self {
            children: HashMap::new(),
            next_num: 1,
            timer: None,
            play: None,
            config,
        }
    }

    /// Register a new actor, fork its task, and return its id.
    fn spawn(&mut self, scene: &Scene, role: Box<dyn Role>, kind: &'static str) -> Result<Id> {
        let num = self.next_num;
        self.next_num += 1;

        let record = Arc::new(Record::new(num, kind, self.config.mailbox_capacity));
        let id = Id::bound(num, &record);

        // A child is minded by whoever minds the stage at its spawn: the
        // stage itself during boot, the passive minder afterwards.
        record.set_minder(scene.minder());

        let env = self.capture_environment(scene);
        let child_scene = Scene::new(id.clone(), scene.stage().clone(), env);
        let task_record = record.clone();
        let handle = thread::Builder::new()
            .name(format!("actor-{num}"))
            .spawn(move || record::run(role, task_record, child_scene))?;
        record.set_task(handle);

        self.children.insert(num, record);
        debug!("actor #{num} ({kind}) entered");
        Ok(id)
    }

    fn capture_environment(&self, scene: &Scene) -> Env {
        match &self.config.environment {
            Some(hook) => hook(scene.stage()),
            None => None,
        }
    }

    fn on_pre_genesis(&mut self, scene: &Scene, seed: PreGenesis) -> Result<()> {
        info!("stage booting");
        let logger = self.spawn(scene, Box::new(Logger), type_name::<Logger>())?;
        let minder = self.spawn(
            scene,
            Box::new(PassiveMinder::new(logger)),
            type_name::<PassiveMinder>(),
        )?;
        scene.set_minder(minder);

        let play = self.spawn(scene, seed.play, seed.kind)?;
        self.play = Some(play.clone());
        scene.say(&play, Genesis)?;
        info!("play {play} is on");
        Ok(())
    }

    fn on_enter(&mut self, scene: &Scene, enter: Enter) -> Result<()> {
        let Enter {
            role,
            kind,
            reply_to,
        } = enter;
        let id = self.spawn(scene, role, kind)?;
        match reply_to {
            Some(caller) => scene.say(&caller, Entered(id)),
            // No reply target: the new actor itself learns of its own
            // entrance. This is the stooge's cue.
            None => scene.say(&id, Entered(id.clone())),
        }
    }

    fn on_left(&mut self, who: &Id) {
        if self.children.remove(&who.number()).is_some() {
            debug!("actor {who} left; {} remain", self.children.len());
        }
    }

    fn on_died(&mut self, scene: &Scene, died: Died) -> Result<()> {
        error!("actor {} died: {}; bringing the stage down", died.who, died.corpse);
        scene.leave()
    }

    /// Graceful shutdown: ask every child to leave, close their inboxes,
    /// and bound the wait for their exit reports with the grace timer.
    fn shutdown_all(&mut self, scene: &Scene) -> Result<()> {
        info!("stage closing: {} actors still on", self.children.len());
        for child in self.children.values() {
            // A full inbox gets no Leave!; the close below ends it anyway.
            let _ = child.mailbox().try_put(Box::new(Leave) as Note);
            child.mailbox().close();
        }
        let stage_record = scene
            .stage()
            .record()
            .expect("a running stage is always local");
        self.timer = Some(ShutdownTimer::arm(
            Arc::downgrade(&stage_record),
            self.config.shutdown_grace,
        )?);
        Ok(())
    }

    /// Close whatever children remain. Every send failure here only says
    /// the recipient is already gone, so none propagate.
    fn kill_all(&mut self) {
        for (num, child) in self.children.drain() {
            if !child.mailbox().is_closed() {
                let _ = child.mailbox().try_put(Box::new(Leave) as Note);
                child.mailbox().close();
                debug!("curtain dropped on actor #{num}");
            }
        }
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Post-message check: once shutdown is underway and the registry is
    /// empty, stop waiting for the timer and close the stage inbox now.
    fn settle(&mut self, scene: &Scene) {
        if self.timer.is_some() && self.children.is_empty() {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
            let _ = scene.leave();
        }
    }

    fn dispatch(&mut self, scene: &Scene, note: Note) -> Result<()> {
        let note = match note.downcast::<PreGenesis>() {
            Ok(seed) => return self.on_pre_genesis(scene, *seed),
            Err(other) => other,
        };
        let note = match note.downcast::<Enter>() {
            Ok(enter) => return self.on_enter(scene, *enter),
            Err(other) => other,
        };
        let note = match note.downcast::<Left>() {
            Ok(left) => {
                self.on_left(&left.0);
                return Ok(());
            }
            Err(other) => other,
        };
        let note = match note.downcast::<Died>() {
            Ok(died) => return self.on_died(scene, *died),
            Err(other) => other,
        };
        // Anything the stage does not understand belongs to the play.
        match &self.play {
            Some(play) => match scene.say_note(play, note) {
                Err(err) if err.is_closed() => {
                    debug!("forward to a play that is already gone");
                    Ok(())
                }
                other => other,
            },
            None => {
                warn!("stage dropped a note: no play to forward it to");
                Ok(())
            }
        }
    }
}

impl Role for Stage {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        let outcome = self.dispatch(scene, note);
        self.settle(scene);
        outcome
    }

    fn on_leave(&mut self, scene: &Scene) -> Result<()> {
        self.shutdown_all(scene)?;
        self.settle(scene);
        Ok(())
    }

    // The stage reports Left! to nobody; it ends the run by sweeping up
    // whatever remains instead.
    fn epilogue(&mut self, _scene: &Scene, _env: &Env) -> Result<()> {
        self.kill_all();
        info!("stage dark");
        Ok(())
    }

    fn dieing_breath(&mut self, scene: &Scene, corpse: &Corpse, _env: &Env) {
        // Report before the sweep, while the minder can still hear it.
        scene.report_died(corpse);
        self.kill_all();
    }
}

/// A constructed, not yet running actor system.
///
/// Produced by [`genesis`]; [`run`](Production::run) drives the stage's
/// dispatcher on the calling thread until shutdown completes.
pub struct Production {
    stage_id: Id,
    record: Arc<Record>,
    stage: Stage,
    scene: Scene,
}

impl Production {
    /// The stage's id (numeric identifier `0`).
    pub fn id(&self) -> &Id {
        &self.stage_id
    }

    /// Drive the stage to completion on the calling thread.
    ///
    /// Returns once the stage inbox has closed and every remaining child
    /// has been swept up. A crash of the stage itself surfaces as an error.
    pub fn run(self) -> Result<()> {
        let Production {
            record,
            stage,
            scene,
            ..
        } = self;
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            record::run(Box::new(stage), record, scene)
        }));
        match outcome {
            Ok(()) => Ok(()),
            Err(payload) => {
                let corpse = Corpse::from_panic(payload.as_ref());
                Err(Error::Other(anyhow!("stage crashed: {}", corpse.reason)))
            }
        }
    }
}

/// Create a stage and seed its boot message, without driving it.
///
/// The observable behavior is construction: the returned production holds
/// a stage whose inbox already contains `PreGenesis!`.
pub fn genesis<P: Role>(play: P) -> Result<Production> {
    genesis_with(StageConfig::default(), play)
}

/// [`genesis`] with explicit configuration.
pub fn genesis_with<P: Role>(config: StageConfig, play: P) -> Result<Production> {
    let record = Arc::new(Record::new(0, type_name::<Stage>(), config.mailbox_capacity));
    let stage_id = Id::bound(0, &record);
    // Until boot installs the passive minder, the stage minds itself.
    record.set_minder(stage_id.clone());
    record
        .mailbox()
        .put(Box::new(PreGenesis {
            play: Box::new(play),
            kind: type_name::<P>(),
        }) as Note)
        .map_err(Error::from)?;

    let env = match &config.environment {
        Some(hook) => hook(&stage_id),
        None => None,
    };
    let scene = Scene::new(stage_id.clone(), stage_id.clone(), env);
    Ok(Production {
        stage_id,
        record,
        stage: Stage::new(config),
        scene,
    })
}

/// Create a stage and drive it on the calling thread until shutdown.
pub fn play<P: Role>(the_play: P) -> Result<()> {
    genesis(the_play)?.run()
}

/// [`play`] with explicit configuration.
pub fn play_with<P: Role>(config: StageConfig, the_play: P) -> Result<()> {
    genesis_with(config, the_play)?.run()
}
