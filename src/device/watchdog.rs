use crate::{Result, SortError};
use crossbeam::utils::Backoff;
use log::warn;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How long a core may spin on a single wait before the launch is declared stuck.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SpinPolicy {
    pub deadline: Option<Duration>,
}

impl SpinPolicy {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn unbounded() -> Self {
        Self { deadline: None }
    }
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::with_deadline(Self::DEFAULT_DEADLINE)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WaitSite {
    Barrier,
    Lookback { tile: usize },
}

impl fmt::Display for WaitSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitSite::Barrier => write!(f, "device barrier"),
            WaitSite::Lookback { tile } => write!(f, "lookback of tile {}", tile),
        }
    }
}

/// Shared by every core of one launch. Enforces the spin deadline and carries the
/// abort flag that releases all other waiters once any core has failed.
pub struct Watchdog {
    policy: SpinPolicy,
    aborted: AtomicBool,
}

impl Watchdog {
    pub fn new(policy: SpinPolicy) -> Self {
        Self {
            policy,
            aborted: AtomicBool::new(false),
        }
    }

    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::AcqRel) {
            warn!("aborting launch");
        }
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Polls until `poll` yields a value, backing off exponentially between attempts.
    pub fn spin<T, F>(&self, site: WaitSite, mut poll: F) -> Result<T>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        if let Some(v) = poll()? {
            return Ok(v);
        }

        let backoff = Backoff::new();
        let start = Instant::now();

        loop {
            if self.is_aborted() {
                return Err(SortError::Aborted);
            }

            if let Some(deadline) = self.policy.deadline {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    return Err(SortError::LivenessTimeout { site, elapsed });
                }
            }

            backoff.snooze();

            if let Some(v) = poll()? {
                return Ok(v);
            }
        }
    }

    pub fn spin_until<F>(&self, site: WaitSite, mut ready: F) -> Result<()>
    where
        F: FnMut() -> bool,
    {
        self.spin(site, || Ok(ready().then_some(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_ready_immediately() {
        let w = Watchdog::new(SpinPolicy::with_deadline(Duration::ZERO));
        assert!(w.spin_until(WaitSite::Barrier, || true).is_ok());
    }

    #[test]
    pub fn test_deadline_expires() {
        let w = Watchdog::new(SpinPolicy::with_deadline(Duration::from_millis(20)));
        let res = w.spin_until(WaitSite::Lookback { tile: 3 }, || false);

        match res {
            Err(SortError::LivenessTimeout { site, elapsed }) => {
                assert_eq!(site, WaitSite::Lookback { tile: 3 });
                assert!(elapsed >= Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    pub fn test_abort_releases_waiter() {
        let w = Watchdog::new(SpinPolicy::unbounded());
        let mut polls = 0;

        let res = w.spin_until(WaitSite::Barrier, || {
            polls += 1;
            if polls == 3 {
                w.abort();
            }
            false
        });

        assert!(matches!(res, Err(SortError::Aborted)));
    }

    #[test]
    pub fn test_poll_error_propagates() {
        let w = Watchdog::new(SpinPolicy::default());
        let res: Result<()> = w.spin(WaitSite::Barrier, || Err(SortError::WidthMismatch));

        assert!(matches!(res, Err(SortError::WidthMismatch)));
    }
}
