use crate::{Result, SortError};
use std::sync::atomic::{AtomicU64, Ordering};

const STATE_SHIFT: u32 = 62;
pub const PAYLOAD_MASK: u64 = (1 << STATE_SHIFT) - 1;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TileState {
    NotInit = 0,
    AggregateReady = 1,
    PrefixReady = 2,
}

/// One decoded status record: a 2-bit state in the top bits of a 64-bit word and a
/// 62-bit count below it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StatusWord {
    pub state: TileState,
    pub payload: u64,
}

impl StatusWord {
    pub const NOT_INIT: StatusWord = StatusWord {
        state: TileState::NotInit,
        payload: 0,
    };

    #[inline]
    pub fn aggregate(count: usize) -> Self {
        Self {
            state: TileState::AggregateReady,
            payload: count as u64 & PAYLOAD_MASK,
        }
    }

    #[inline]
    pub fn prefix(count: usize) -> Self {
        Self {
            state: TileState::PrefixReady,
            payload: count as u64 & PAYLOAD_MASK,
        }
    }

    #[inline]
    pub fn pack(self) -> u64 {
        ((self.state as u64) << STATE_SHIFT) | (self.payload & PAYLOAD_MASK)
    }

    #[inline]
    pub fn unpack(raw: u64, tile: usize) -> Result<Self> {
        let state = match raw >> STATE_SHIFT {
            0 => TileState::NotInit,
            1 => TileState::AggregateReady,
            2 => TileState::PrefixReady,
            _ => return Err(SortError::CorruptStatus { tile, raw }),
        };

        Ok(Self {
            state,
            payload: raw & PAYLOAD_MASK,
        })
    }

    #[inline]
    pub fn publish(self, slot: &AtomicU64) {
        slot.store(self.pack(), Ordering::Release);
    }

    #[inline]
    pub fn observe(slot: &AtomicU64, tile: usize) -> Result<Self> {
        Self::unpack(slot.load(Ordering::Acquire), tile)
    }
}
