//! Exclusive compute unit allocation
//!
//! One binary lock per lock-bearing unit, in discovery order. Acquisition is
//! a polling loop: non-blocking passes over all slots with a short sleep
//! between passes, bounded by the caller's timeout. There is no wait queue,
//! so no fairness guarantee among concurrent waiters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::resources::inventory::Inventory;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Slot {
    unit_id: u32,
    busy: AtomicBool,
}

/// Allocator over the lock-bearing units of an [`Inventory`]
pub struct Allocator {
    slots: Vec<Slot>,
    poll_interval: Duration,
}

impl Allocator {
    /// Build the lock set from an inventory, one slot per lock-bearing unit.
    ///
    /// An inventory with only a CPU placeholder yields an empty lock set;
    /// `acquire` then always times out.
    pub fn new(inventory: &Inventory) -> Self {
        Self::with_poll_interval(inventory, DEFAULT_POLL_INTERVAL)
    }

    /// Build the lock set with a custom poll interval
    pub fn with_poll_interval(inventory: &Inventory, poll_interval: Duration) -> Self {
        let slots = inventory
            .units()
            .iter()
            .filter(|u| u.kind.is_lockable())
            .map(|u| Slot {
                unit_id: u.id,
                busy: AtomicBool::new(false),
            })
            .collect();

        Self {
            slots,
            poll_interval,
        }
    }

    /// Acquire a free unit, waiting up to `timeout`.
    ///
    /// Performs at least one full pass over the lock set even with a zero
    /// timeout. Returns the acquired unit id, or `None` once the budget is
    /// exhausted. Latecomers may win over earlier waiters.
    pub async fn acquire(&self, timeout: Duration) -> Option<u32> {
        let start = Instant::now();
        loop {
            if let Some(id) = self.try_acquire() {
                return Some(id);
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(timeout_ms = timeout.as_millis() as u64, "acquire timed out");
                return None;
            }

            let remaining = timeout - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    /// One non-blocking pass over all slots in fixed order
    pub fn try_acquire(&self) -> Option<u32> {
        for slot in &self.slots {
            if slot
                .busy
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                debug!(unit_id = slot.unit_id, "acquired compute unit");
                return Some(slot.unit_id);
            }
        }
        None
    }

    /// Release the lock for the given unit.
    ///
    /// Unknown ids and already-free slots are logged no-ops.
    pub fn release(&self, unit_id: u32) {
        match self.slots.iter().find(|s| s.unit_id == unit_id) {
            Some(slot) => {
                if slot.busy.swap(false, Ordering::Release) {
                    debug!(unit_id, "released compute unit");
                } else {
                    warn!(unit_id, "release of a unit that was not held");
                }
            }
            None => {
                warn!(unit_id, "release of unknown unit id ignored");
            }
        }
    }

    /// Number of units currently held
    pub fn held_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.busy.load(Ordering::Acquire))
            .count()
    }

    /// Number of lock-bearing units
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::inventory::{ResourceUnit, UnitKind};

    fn gpu_inventory(n: u32) -> Inventory {
        Inventory::from_units(
            (0..n)
                .map(|id| ResourceUnit {
                    id,
                    kind: UnitKind::Dedicated,
                    memory: "8192 MiB".to_string(),
                    name: format!("GPU {id}"),
                })
                .collect(),
        )
    }

    #[test]
    fn test_lock_set_excludes_cpu_units() {
        let inventory = Inventory::from_units(vec![ResourceUnit {
            id: 0,
            kind: UnitKind::Cpu,
            memory: "N/A".to_string(),
            name: "CPU".to_string(),
        }]);
        let allocator = Allocator::new(&inventory);
        assert_eq!(allocator.slot_count(), 0);
    }

    #[test]
    fn test_try_acquire_fixed_order() {
        let allocator = Allocator::new(&gpu_inventory(2));
        assert_eq!(allocator.try_acquire(), Some(0));
        assert_eq!(allocator.try_acquire(), Some(1));
        assert_eq!(allocator.try_acquire(), None);
        assert_eq!(allocator.held_count(), 2);
    }

    #[test]
    fn test_release_makes_unit_acquirable_again() {
        let allocator = Allocator::new(&gpu_inventory(1));
        assert_eq!(allocator.try_acquire(), Some(0));
        allocator.release(0);
        assert_eq!(allocator.try_acquire(), Some(0));
    }
}
