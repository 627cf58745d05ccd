//! End-to-end lifecycle scenarios: spawn, ask, graceful shutdown, the
//! grace timer, delegation and environment capture.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use troupe::{play, play_with, Genesis, Id, Leave, Note, Result, Role, Scene, StageConfig};

/// Replies "hi" to whoever a `Greet` names.
struct Parrot;

struct Greet(Id);

impl Role for Parrot {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if let Ok(greet) = note.downcast::<Greet>() {
            scene.say(&greet.0, "hi".to_string())?;
        }
        Ok(())
    }
}

struct HelloPlay {
    heard: Arc<Mutex<Option<String>>>,
}

impl Role for HelloPlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            let child = scene.enter(Parrot)?;
            let reply: String = scene.ask(&child, Greet(scene.me().clone()))?;
            *self.heard.lock().unwrap() = Some(reply);
            scene.say(scene.stage(), Leave)?;
        }
        Ok(())
    }
}

#[test]
fn test_hello_round_trip() {
    let heard = Arc::new(Mutex::new(None));
    let started = Instant::now();

    play(HelloPlay {
        heard: heard.clone(),
    })
    .unwrap();

    assert_eq!(heard.lock().unwrap().as_deref(), Some("hi"));
    // Fast-path shutdown: no need to wait out the grace timer.
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Flags its own orderly exit before reporting `Left!`.
struct ExitProbe {
    exited: Arc<AtomicBool>,
}

impl Role for ExitProbe {
    fn hear(&mut self, _scene: &Scene, _note: Note) -> Result<()> {
        Ok(())
    }

    fn epilogue(&mut self, scene: &Scene, _env: &troupe::Env) -> Result<()> {
        self.exited.store(true, Ordering::SeqCst);
        scene.report_left()
    }
}

struct ProbePlay {
    probes: Vec<Arc<AtomicBool>>,
}

impl Role for ProbePlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            for exited in &self.probes {
                scene.enter(ExitProbe {
                    exited: exited.clone(),
                })?;
            }
            scene.say(scene.stage(), Leave)?;
        }
        Ok(())
    }
}

#[test]
fn test_shutdown_drains_every_child() {
    let probes: Vec<_> = (0..3).map(|_| Arc::new(AtomicBool::new(false))).collect();

    play(ProbePlay {
        probes: probes.clone(),
    })
    .unwrap();

    for exited in &probes {
        assert!(
            exited.load(Ordering::SeqCst),
            "every child runs its epilogue before the stage goes dark"
        );
    }
}

struct Mute;

impl Role for Mute {
    fn hear(&mut self, _scene: &Scene, _note: Note) -> Result<()> {
        Ok(())
    }
}

struct ChurnPlay {
    numbers: Arc<Mutex<Vec<u64>>>,
}

impl Role for ChurnPlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            let first = scene.enter(Mute)?;
            // Retire the first actor before spawning more; its identifier
            // must stay burned.
            scene.say(&first, Leave)?;
            let second = scene.enter(Mute)?;
            let third = scene.enter(Mute)?;
            let mut numbers = self.numbers.lock().unwrap();
            numbers.push(first.number());
            numbers.push(second.number());
            numbers.push(third.number());
            drop(numbers);
            scene.say(scene.stage(), Leave)?;
        }
        Ok(())
    }
}

#[test]
fn test_identifiers_are_monotonic_and_unique() {
    let numbers = Arc::new(Mutex::new(Vec::new()));

    play(ChurnPlay {
        numbers: numbers.clone(),
    })
    .unwrap();

    let numbers = numbers.lock().unwrap();
    assert_eq!(numbers.len(), 3);
    assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(numbers.iter().all(|&n| n != 0), "0 belongs to the stage");
}

struct DelegatePlay;

impl Role for DelegatePlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            // The stooge does the leaving; this play never speaks again.
            scene.delegate(|s| s.say(s.stage(), Leave))?;
        }
        Ok(())
    }
}

#[test]
fn test_delegate_shuts_the_system_down() {
    let started = Instant::now();
    play(DelegatePlay).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
}

struct Stall;

/// Wedges itself in a handler long enough to miss the grace window.
struct Sloth;

impl Role for Sloth {
    fn hear(&mut self, _scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Stall>() {
            thread::sleep(Duration::from_secs(5));
        }
        Ok(())
    }
}

struct SlothPlay;

impl Role for SlothPlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            let sloth = scene.enter(Sloth)?;
            scene.say(&sloth, Stall)?;
            scene.say(scene.stage(), Leave)?;
        }
        Ok(())
    }
}

#[test]
fn test_grace_timer_abandons_stragglers() {
    let config = StageConfig {
        shutdown_grace: Duration::from_millis(300),
        ..StageConfig::default()
    };
    let started = Instant::now();

    play_with(config, SlothPlay).unwrap();

    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_secs(3),
        "the stage must not wait out the wedged child, took {elapsed:?}"
    );
}

struct EnvPlay {
    seen: Arc<AtomicUsize>,
}

impl Role for EnvPlay {
    fn hear(&mut self, scene: &Scene, note: Note) -> Result<()> {
        if note.is::<Genesis>() {
            let backstage = scene
                .env()
                .as_ref()
                .and_then(|env| env.downcast_ref::<String>())
                .cloned();
            if backstage.as_deref() == Some("backstage") {
                self.seen.fetch_add(1, Ordering::SeqCst);
            }
            scene.say(scene.stage(), Leave)?;
        }
        Ok(())
    }
}

#[test]
fn test_environment_rides_on_the_scene() {
    let seen = Arc::new(AtomicUsize::new(0));
    let config = StageConfig {
        environment: Some(Arc::new(|_stage: &Id| {
            Some(Arc::new("backstage".to_string()) as Arc<dyn std::any::Any + Send + Sync>)
        })),
        ..StageConfig::default()
    };

    play_with(config, EnvPlay { seen: seen.clone() }).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
