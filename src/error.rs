//! Error types for the troupe runtime.
//!
//! The errors are organized the way the rest of the crate is: mailbox
//! failures carry their own small enum, and the root `Error` type wraps
//! everything the runtime can report, so callers handle one type at the
//! seams. Programmer errors (touching an actor from a task that does not
//! own it, binding an actor twice) are not represented here at all; those
//! panic immediately and surface as a `Died!` report.

use std::time::Duration;

use thiserror::Error;

use crate::id::Id;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error when putting a message into a mailbox.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// The mailbox is full (bounded capacity reached).
    #[error("mailbox is full")]
    Full,

    /// The mailbox has been closed and accepts no further messages.
    #[error("mailbox is closed")]
    Closed,
}

/// Root error type for the troupe runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A mailbox refused the operation.
    #[error("mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    /// The target identity carries no local binding.
    #[error("actor {0} is remote; deliver through a troupe broadcast instead")]
    Remote(Id),

    /// The target actor's record is gone; it has already left the stage.
    #[error("actor {0} has left the stage")]
    Expired(Id),

    /// An actor asked itself, which can never be answered.
    #[error("ask from {0} to itself would deadlock")]
    SelfAsk(Id),

    /// The asker's inbox closed before a reply of the asked shape arrived.
    #[error("inbox closed before a reply of the asked shape arrived")]
    AskInterrupted,

    /// No reply of the asked shape arrived within the deadline.
    #[error("no reply of the asked shape within {0:?}")]
    AskTimeout(Duration),

    /// The operating system refused to fork a task for an actor.
    #[error("could not fork an actor task: {0}")]
    Spawn(#[from] std::io::Error),

    /// A failure raised by user handler code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// True when the failure only says the recipient is already gone.
    ///
    /// During shutdown these races are expected and the runtime swallows
    /// them; everywhere else they propagate.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Error::Mailbox(MailboxError::Closed) | Error::Expired(_)
        )
    }
}
