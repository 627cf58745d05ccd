#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Troupe
//!
//! A lightweight actor runtime: programs are built out of isolated units
//! ("actors") that communicate exclusively by asynchronous messages and are
//! supervised by a hierarchy of minder actors.
//!
//! The runtime provides:
//!
//! - Actor identity and bounded mailboxes with backpressure
//! - A per-actor dispatch loop binding each actor to exactly one task
//! - The stage: the registry and root actor orchestrating birth, death and
//!   deterministic shutdown
//! - Synchronous ask/reply over asynchronous messaging, with the caller's
//!   mailbox transparently restored
//! - Supervision: crashes travel as `Died!` reports to minder actors; the
//!   default policy logs and shuts the system down
//!
//! Each actor owns one task for its whole life and has exclusive access to
//! its own state: handlers take `&mut self`, messages arrive strictly in
//! mailbox order, and the only shared structures are the mailboxes
//! themselves.
//!
//! ## Example
//!
//! ```no_run
//! use troupe::{play, Genesis, Leave, Note, Role, Scene};
//!
//! struct Hello;
//!
//! impl Role for Hello {
//!     fn hear(&mut self, scene: &Scene, note: Note) -> troupe::Result<()> {
//!         if note.is::<Genesis>() {
//!             println!("the stage is lit");
//!             scene.say(scene.stage(), Leave)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> troupe::Result<()> {
//!     play(Hello)
//! }
//! ```

/// Actor behavior, mailboxes, records and supervision.
pub mod actor;

/// Built-in actors: logger, stooge, troupe.
pub mod cast;

/// Stage configuration.
pub mod config;

/// Error types.
pub mod error;

/// Actor identities.
pub mod id;

/// Runtime message types.
pub mod message;

/// Per-actor execution context and the messaging API.
pub mod scene;

/// The stage: registry, boot and shutdown.
pub mod stage;

pub use actor::mailbox::{Mailbox, TakeTimeout, DEFAULT_MAILBOX_CAPACITY};
pub use actor::supervisor::PassiveMinder;
pub use actor::Role;
pub use cast::{Logger, Stooge, Troupe};
pub use config::{EnvHook, StageConfig};
pub use error::{Error, MailboxError, Result};
pub use id::Id;
pub use message::{Corpse, Died, Enter, Entered, Genesis, Leave, Left, LogDied, Note};
pub use scene::{Env, Scene};
pub use stage::{genesis, genesis_with, play, play_with, Production, Stage};
