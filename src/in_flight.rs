//! Single-flight registry: at most one event per user is processed at a time.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::session::UserId;

/// Users whose previous event is still being handled
#[derive(Debug, Default)]
pub struct InFlight {
    users: Mutex<HashSet<UserId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `user` busy, or return `None` if an event is already running
    pub fn try_begin(&self, user: UserId) -> Option<InFlightGuard<'_>> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.insert(user) {
            Some(InFlightGuard {
                registry: self,
                user,
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self, user: UserId) -> bool {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user)
    }
}

/// Releases the user when dropped, including on early return or panic unwind
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlight,
    user: UserId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected_until_guard_drops() {
        let in_flight = InFlight::new();

        let guard = in_flight.try_begin(1);
        assert!(guard.is_some());
        assert!(in_flight.try_begin(1).is_none());
        assert!(in_flight.try_begin(2).is_some());

        drop(guard);
        assert!(!in_flight.is_busy(1));
        assert!(in_flight.try_begin(1).is_some());
    }
}
