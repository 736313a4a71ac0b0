//! The execution model the sort runs on: a fixed array of cores that share memory, run
//! the same kernel, and coordinate only through a device-wide barrier and acquire/release
//! polling of shared words.
//!
//! Each core is a dedicated rayon worker. A launch broadcasts the kernel to every worker of
//! a pool sized exactly to the launch, so all cores are resident at the same time and spin
//! waits can never starve a core that has not been scheduled.

mod barrier;
mod shared;
mod watchdog;
mod workspace;

pub use barrier::DeviceBarrier;
pub use shared::SharedSlice;
pub use watchdog::{SpinPolicy, WaitSite, Watchdog};
pub use workspace::{Workspace, WorkspaceLayout};
pub(crate) use workspace::WorkspaceRegions;

use crate::{Result, SortError};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct Device {
    pool: ThreadPool,
    cores: usize,
}

/// What a kernel knows about the core it is running on.
pub struct LaunchContext<'a> {
    core: usize,
    barrier: &'a DeviceBarrier,
    watchdog: &'a Watchdog,
}

impl<'a> LaunchContext<'a> {
    #[inline]
    pub fn core(&self) -> usize {
        self.core
    }

    #[inline]
    pub fn watchdog(&self) -> &Watchdog {
        self.watchdog
    }

    #[inline]
    pub fn sync(&self) -> Result<()> {
        self.barrier.wait(self.watchdog)
    }
}

impl Device {
    pub fn new(cores: usize) -> Result<Self> {
        let cores = cores.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(cores)
            .thread_name(|i| format!("argsort-core-{}", i))
            .build()?;

        Ok(Self { pool, cores })
    }

    #[inline]
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// Runs data-parallel work that needs no cross-core coordination.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Runs `kernel` once on every core. The first core to fail aborts the launch, and its
    /// error is the one reported.
    pub fn launch<F>(&self, policy: SpinPolicy, kernel: F) -> Result<()>
    where
        F: Fn(&LaunchContext) -> Result<()> + Sync,
    {
        let barrier = DeviceBarrier::new(self.cores);
        let watchdog = Watchdog::new(policy);

        debug!("launching kernel on {} cores", self.cores);

        let results = self.pool.broadcast(|b| {
            let ctx = LaunchContext {
                core: b.index(),
                barrier: &barrier,
                watchdog: &watchdog,
            };

            let res = kernel(&ctx);
            if res.is_err() {
                watchdog.abort();
            }

            res
        });

        let mut first_err: Option<SortError> = None;
        for err in results.into_iter().filter_map(|r| r.err()) {
            match &first_err {
                Some(e) if e.is_root_cause() => {}
                _ => first_err = Some(err),
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
