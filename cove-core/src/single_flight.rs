use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Guards against concurrent duplicate external calls for the same booking
/// draft. `begin` hands out at most one live [`FlightGuard`] per key; the key
/// is released when the guard drops.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while a guard for `key` is already live.
    pub fn begin(&self, key: Uuid) -> Option<FlightGuard> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key) {
            return None;
        }
        Some(FlightGuard {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, key: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key)
    }
}

#[derive(Debug)]
pub struct FlightGuard {
    key: Uuid,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
