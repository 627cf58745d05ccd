//! Actor identities.
//!
//! An [`Id`] is a small handle naming one actor on a stage: a numeric
//! identifier plus, for local actors, a weak binding to the actor's record.
//! Identifiers are assigned by the stage from a monotonic counter and are
//! never reused; identifier `0` is reserved for the stage itself. Two ids
//! are equal exactly when their numeric identifiers are equal.
//!
//! The binding is weak on purpose: an `Id` never extends an actor's
//! lifetime. Once the actor has left the stage and its record is dropped,
//! every surviving `Id` still names it but can no longer reach it.
//!
//! # Examples
//!
//! ```
//! use troupe::Id;
//!
//! let here = Id::remote(3);
//! let there = Id::remote(3);
//! assert_eq!(here, there);
//! assert!(here.is_remote());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::actor::record::Record;
use crate::error::{Error, Result};

/// Handle to an actor.
///
/// Cheap to clone and safe to compare across tasks. An id without a local
/// binding denotes a remote actor; messages for it must travel through a
/// broadcast (see [`Scene::shout`](crate::Scene::shout)).
#[derive(Clone, Serialize, Deserialize)]
pub struct Id {
    num: u64,
    #[serde(skip)]
    binding: Option<Weak<Record>>,
}

impl Id {
    /// Create an id bound to a local actor record.
    pub(crate) fn bound(num: u64, record: &Arc<Record>) -> Self {
        Self {
            num,
            binding: Some(Arc::downgrade(record)),
        }
    }

    /// Create an id with no local binding.
    ///
    /// Such an id names an actor living elsewhere; the runtime refuses to
    /// `say` to it directly.
    pub fn remote(num: u64) -> Self {
        Self { num, binding: None }
    }

    /// The numeric identifier, unique within a stage. `0` is the stage.
    pub fn number(&self) -> u64 {
        self.num
    }

    /// True when this id names the stage itself.
    pub fn is_stage(&self) -> bool {
        self.num == 0
    }

    /// True when this id carries no local binding.
    pub fn is_remote(&self) -> bool {
        self.binding.is_none()
    }

    /// Resolve the local actor record behind this id.
    pub(crate) fn record(&self) -> Result<Arc<Record>> {
        match &self.binding {
            None => Err(Error::Remote(self.clone())),
            Some(weak) => weak.upgrade().ok_or_else(|| Error::Expired(self.clone())),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.num == other.num
    }
}

impl Eq for Id {}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        self.num.cmp(&other.num)
    }
}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.num.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.num)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Id")
            .field("num", &self.num)
            .field("remote", &self.is_remote())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_number() {
        let record = Arc::new(Record::new(5, "test", 8));
        let bound = Id::bound(5, &record);
        let unbound = Id::remote(5);
        assert_eq!(bound, unbound);
        assert_ne!(bound, Id::remote(6));
    }

    #[test]
    fn test_stage_is_zero() {
        assert!(Id::remote(0).is_stage());
        assert!(!Id::remote(1).is_stage());
    }

    #[test]
    fn test_remote_record_fails() {
        let id = Id::remote(9);
        assert!(matches!(id.record(), Err(Error::Remote(_))));
    }

    #[test]
    fn test_dropped_record_expires() {
        let record = Arc::new(Record::new(2, "test", 8));
        let id = Id::bound(2, &record);
        assert!(id.record().is_ok());
        drop(record);
        assert!(matches!(id.record(), Err(Error::Expired(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Id::remote(17).to_string(), "#17");
    }

    #[test]
    fn test_serde_round_trip_loses_binding() {
        let record = Arc::new(Record::new(11, "test", 8));
        let id = Id::bound(11, &record);
        let json = serde_json::to_string(&id).unwrap();
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(back.is_remote());
    }
}
