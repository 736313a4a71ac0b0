//! `DecoupledLookback` is a lock-free chained scan across tiles.
//!
//! Every tile publishes its per-bin counts as soon as it has them (`AggregateReady`), then
//! walks back over its predecessors accumulating their counts until it meets one that has
//! already resolved its inclusive prefix (`PrefixReady`). It then publishes its own inclusive
//! prefix, so later tiles rarely need to walk far.
//!
//! ## Characteristics
//!
//!  * single writer per record, many readers
//!  * result independent of the order in which tiles finish
//!  * generic over the digit width and the scan direction
//!
//! A tile only reads a predecessor when all of its bins agree on one state. A partially
//! updated record set is treated exactly like `NotInit` and retried.

use crate::device::{WaitSite, Watchdog};
use crate::scan::status::{StatusWord, TileState};
use crate::{Result, SortError};
use log::trace;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScanDirection {
    /// Tile `t` depends on tiles `0..t`.
    Forward,
    /// Tile `t` depends on tiles `t + 1..tile_count`.
    Reverse,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WalkStep {
    /// The current predecessor is not readable yet.
    Pending,
    /// Accumulated one aggregate and moved one tile further back.
    Advanced,
    /// The exclusive prefix is complete.
    Resolved,
}

pub struct DecoupledLookback<'a, const RADIX_BITS: usize = 8> {
    records: &'a [AtomicU64],
    tile_count: usize,
    direction: ScanDirection,
}

impl<'a, const RADIX_BITS: usize> DecoupledLookback<'a, RADIX_BITS> {
    pub const BINS: usize = 1 << RADIX_BITS;

    pub fn new(
        records: &'a [AtomicU64],
        tile_count: usize,
        direction: ScanDirection,
    ) -> Result<Self> {
        let needed = tile_count * Self::BINS;
        if records.len() < needed {
            return Err(SortError::InvalidTiling(format!(
                "{} status records cannot hold {} tiles of {} bins",
                records.len(),
                tile_count,
                Self::BINS
            )));
        }

        Ok(Self {
            records: &records[..needed],
            tile_count,
            direction,
        })
    }

    #[inline]
    fn rank(&self, tile: usize) -> usize {
        match self.direction {
            ScanDirection::Forward => tile,
            ScanDirection::Reverse => self.tile_count - 1 - tile,
        }
    }

    #[inline]
    pub fn is_first(&self, tile: usize) -> bool {
        self.rank(tile) == 0
    }

    #[inline]
    pub fn is_last(&self, tile: usize) -> bool {
        self.rank(tile) + 1 == self.tile_count
    }

    #[inline]
    fn predecessor(&self, tile: usize) -> Option<usize> {
        if self.is_first(tile) {
            return None;
        }

        match self.direction {
            ScanDirection::Forward => Some(tile - 1),
            ScanDirection::Reverse => Some(tile + 1),
        }
    }

    #[inline]
    fn tile_records(&self, tile: usize) -> &[AtomicU64] {
        &self.records[tile * Self::BINS..(tile + 1) * Self::BINS]
    }

    /// Resets a tile to `NotInit`. Must be followed by a barrier before any tile of the
    /// same scan publishes.
    pub fn clear(&self, tile: usize) {
        for r in self.tile_records(tile) {
            r.store(StatusWord::NOT_INIT.pack(), Ordering::Relaxed);
        }
    }

    /// The last tile is never read, so it publishes nothing.
    pub fn publish_aggregate(&self, tile: usize, counts: &[usize]) {
        if self.is_last(tile) {
            return;
        }

        for (r, c) in self.tile_records(tile).iter().zip(counts) {
            StatusWord::aggregate(*c).publish(r);
        }
    }

    pub fn publish_prefix(&self, tile: usize, inclusive: &[usize]) {
        if self.is_last(tile) {
            return;
        }

        for (r, c) in self.tile_records(tile).iter().zip(inclusive) {
            StatusWord::prefix(*c).publish(r);
        }
    }

    pub fn walker(&self, tile: usize) -> LookbackWalk {
        LookbackWalk {
            tile,
            cursor: self.predecessor(tile),
            prefix: vec![0; Self::BINS],
            snapshot: vec![0; Self::BINS],
        }
    }

    /// Blocks until every predecessor of `tile` is accounted for and returns its
    /// exclusive prefix per bin.
    pub fn lookback(&self, tile: usize, watchdog: &Watchdog) -> Result<Vec<usize>> {
        let mut walk = self.walker(tile);

        watchdog.spin(WaitSite::Lookback { tile }, || loop {
            match walk.step(self)? {
                WalkStep::Advanced => continue,
                WalkStep::Pending => return Ok(None),
                WalkStep::Resolved => return Ok(Some(())),
            }
        })?;

        Ok(walk.into_prefix())
    }

    /// Looks back, publishes the tile's inclusive prefix and returns its exclusive one.
    pub fn resolve(&self, tile: usize, counts: &[usize], watchdog: &Watchdog) -> Result<Vec<usize>> {
        let exclusive = if self.is_first(tile) {
            vec![0; Self::BINS]
        } else {
            self.lookback(tile, watchdog)?
        };

        if !self.is_last(tile) {
            let inclusive: Vec<usize> = exclusive.iter().zip(counts).map(|(e, c)| e + c).collect();
            self.publish_prefix(tile, &inclusive);
        }

        Ok(exclusive)
    }
}

/// A resumable backward walk. Each `step` reads one predecessor at most once, which lets
/// tests drive arbitrary interleavings of many tiles from a single thread.
pub struct LookbackWalk {
    tile: usize,
    cursor: Option<usize>,
    prefix: Vec<usize>,
    snapshot: Vec<usize>,
}

impl LookbackWalk {
    pub fn step<const RADIX_BITS: usize>(
        &mut self,
        scan: &DecoupledLookback<'_, RADIX_BITS>,
    ) -> Result<WalkStep> {
        let pred = match self.cursor {
            Some(p) => p,
            None => return Ok(WalkStep::Resolved),
        };

        let mut state = None;
        for (s, r) in self.snapshot.iter_mut().zip(scan.tile_records(pred)) {
            let word = StatusWord::observe(r, pred)?;

            if word.state == TileState::NotInit || state.is_some_and(|st| st != word.state) {
                return Ok(WalkStep::Pending);
            }

            state = Some(word.state);
            *s = word.payload as usize;
        }

        for (p, s) in self.prefix.iter_mut().zip(&self.snapshot) {
            *p += s;
        }

        if state == Some(TileState::PrefixReady) {
            trace!("tile {} resolved at inclusive prefix of {}", self.tile, pred);
            self.cursor = None;
            return Ok(WalkStep::Resolved);
        }

        self.cursor = scan.predecessor(pred);

        Ok(if self.cursor.is_none() {
            WalkStep::Resolved
        } else {
            WalkStep::Advanced
        })
    }

    pub fn into_prefix(self) -> Vec<usize> {
        self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SpinPolicy;
    use nanorand::{Rng, WyRand};
    use std::time::Duration;

    fn records(n: usize) -> Vec<AtomicU64> {
        (0..n).map(|_| AtomicU64::new(0)).collect()
    }

    fn tile_counts(rng: &mut WyRand, tiles: usize, bins: usize) -> Vec<Vec<usize>> {
        (0..tiles)
            .map(|_| (0..bins).map(|_| rng.generate_range(0usize..50)).collect())
            .collect()
    }

    fn expected_exclusive(counts: &[Vec<usize>], direction: ScanDirection) -> Vec<Vec<usize>> {
        let bins = counts[0].len();
        let mut out = vec![vec![0; bins]; counts.len()];
        let mut order: Vec<usize> = (0..counts.len()).collect();
        if direction == ScanDirection::Reverse {
            order.reverse();
        }

        let mut running = vec![0; bins];
        for t in order {
            out[t] = running.clone();
            for (r, c) in running.iter_mut().zip(&counts[t]) {
                *r += c;
            }
        }

        out
    }

    #[derive(Clone, Copy)]
    enum Phase {
        Publish,
        Walk,
        Done,
    }

    // Drives every tile through publish -> walk -> resolve with a random scheduler.
    fn simulate<const B: usize>(seed: u64, tiles: usize, direction: ScanDirection) {
        let mut rng = WyRand::new_seed(seed);
        let bins = 1 << B;
        let counts = tile_counts(&mut rng, tiles, bins);
        let store = records(tiles * bins);
        let scan: DecoupledLookback<B> = DecoupledLookback::new(&store, tiles, direction).unwrap();

        let mut phases = vec![Phase::Publish; tiles];
        let mut walks: Vec<Option<LookbackWalk>> = (0..tiles).map(|_| None).collect();
        let mut results = vec![None; tiles];
        let mut remaining = tiles;

        while remaining > 0 {
            let t = rng.generate_range(0..tiles);

            match phases[t] {
                Phase::Publish => {
                    scan.publish_aggregate(t, &counts[t]);
                    walks[t] = Some(scan.walker(t));
                    phases[t] = Phase::Walk;
                }
                Phase::Walk => {
                    let walk = walks[t].as_mut().unwrap();
                    if walk.step(&scan).unwrap() == WalkStep::Resolved {
                        let exclusive = walks[t].take().unwrap().into_prefix();
                        let inclusive: Vec<usize> =
                            exclusive.iter().zip(&counts[t]).map(|(e, c)| e + c).collect();
                        scan.publish_prefix(t, &inclusive);
                        results[t] = Some(exclusive);
                        phases[t] = Phase::Done;
                        remaining -= 1;
                    }
                }
                Phase::Done => {}
            }
        }

        let expected = expected_exclusive(&counts, direction);
        for t in 0..tiles {
            assert_eq!(results[t].as_ref().unwrap(), &expected[t], "tile {}", t);
        }
    }

    #[test]
    pub fn test_order_independent_forward() {
        for seed in 0..200 {
            simulate::<8>(seed, 1 + (seed as usize % 13), ScanDirection::Forward);
        }
    }

    #[test]
    pub fn test_order_independent_reverse() {
        for seed in 0..200 {
            simulate::<4>(seed, 1 + (seed as usize % 9), ScanDirection::Reverse);
        }
    }

    #[test]
    pub fn test_single_tile_resolves_trivially() {
        let store = records(256);
        let scan: DecoupledLookback = DecoupledLookback::new(&store, 1, ScanDirection::Forward).unwrap();
        let watchdog = Watchdog::new(SpinPolicy::with_deadline(Duration::ZERO));
        let counts = vec![3usize; 256];

        scan.publish_aggregate(0, &counts);
        let exclusive = scan.resolve(0, &counts, &watchdog).unwrap();

        assert_eq!(exclusive, vec![0; 256]);
        assert!(store.iter().all(|r| r.load(Ordering::Relaxed) == 0));
    }

    #[test]
    pub fn test_mixed_states_are_retried() {
        let store = records(2 * 4);
        let scan: DecoupledLookback<2> = DecoupledLookback::new(&store, 2, ScanDirection::Forward).unwrap();

        scan.publish_aggregate(0, &[1, 2, 3, 4]);
        StatusWord::prefix(9).publish(&store[0]);

        let mut walk = scan.walker(1);
        assert_eq!(walk.step(&scan).unwrap(), WalkStep::Pending);

        scan.publish_prefix(0, &[1, 2, 3, 4]);
        assert_eq!(walk.step(&scan).unwrap(), WalkStep::Resolved);
        assert_eq!(walk.into_prefix(), vec![1, 2, 3, 4]);
    }

    #[test]
    pub fn test_threads_finish_in_any_order() {
        let tiles = 8;
        let mut rng = WyRand::new_seed(7);
        let counts = tile_counts(&mut rng, tiles, 256);
        let store = records(tiles * 256);
        let scan: DecoupledLookback = DecoupledLookback::new(&store, tiles, ScanDirection::Forward).unwrap();
        let watchdog = Watchdog::new(SpinPolicy::default());
        let expected = expected_exclusive(&counts, ScanDirection::Forward);

        let results: Vec<Vec<usize>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..tiles)
                .rev()
                .map(|t| {
                    let (scan, watchdog, counts) = (&scan, &watchdog, &counts);
                    s.spawn(move || {
                        std::thread::sleep(Duration::from_millis(((tiles - t) * 2) as u64));
                        scan.publish_aggregate(t, &counts[t]);
                        (t, scan.resolve(t, &counts[t], watchdog).unwrap())
                    })
                })
                .collect();

            let mut out = vec![Vec::new(); tiles];
            for h in handles {
                let (t, r) = h.join().unwrap();
                out[t] = r;
            }
            out
        });

        assert_eq!(results, expected);
    }

    #[test]
    pub fn test_missing_predecessor_times_out() {
        let store = records(3 * 256);
        let scan: DecoupledLookback = DecoupledLookback::new(&store, 3, ScanDirection::Forward).unwrap();
        let watchdog = Watchdog::new(SpinPolicy::with_deadline(Duration::from_millis(10)));

        let res = scan.resolve(2, &vec![1; 256], &watchdog);
        assert!(matches!(
            res,
            Err(SortError::LivenessTimeout {
                site: WaitSite::Lookback { tile: 2 },
                ..
            })
        ));
    }

    #[test]
    pub fn test_short_record_store_rejected() {
        let store = records(255);
        assert!(DecoupledLookback::<8>::new(&store, 1, ScanDirection::Forward).is_err());
    }
}
