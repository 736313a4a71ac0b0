use crate::device::watchdog::{WaitSite, Watchdog};
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Device-wide generation-counting spin barrier. Every core of a launch must reach each
/// `wait`, including cores that have no row to work on.
pub struct DeviceBarrier {
    parties: usize,
    arrived: AtomicUsize,
    generation: AtomicUsize,
}

impl DeviceBarrier {
    pub fn new(parties: usize) -> Self {
        Self {
            parties,
            arrived: AtomicUsize::new(0),
            generation: AtomicUsize::new(0),
        }
    }

    pub fn wait(&self, watchdog: &Watchdog) -> Result<()> {
        let generation = self.generation.load(Ordering::Acquire);

        if self.arrived.fetch_add(1, Ordering::AcqRel) + 1 == self.parties {
            // Reset before release so early leavers of this round count into the next.
            self.arrived.store(0, Ordering::Relaxed);
            self.generation.fetch_add(1, Ordering::AcqRel);

            return Ok(());
        }

        watchdog.spin_until(WaitSite::Barrier, || {
            self.generation.load(Ordering::Acquire) != generation
        })
    }
}
