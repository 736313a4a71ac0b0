use crate::key_view::{KeyView, KeyWidth};
use crate::radix_key::SortIndex;
use crate::tiling::{SortPath, TilingParams};
use crate::utils::RADIX;
use crate::{Result, SortError};
use arbitrary_chunks::ArbitraryChunks;
use std::mem::size_of;
use std::sync::atomic::AtomicU64;

/// Element counts of each workspace region, laid out as
/// `[exclusiveBins][tileStatus][indexCopy][valueCopy]`.
///
/// `tileStatus` doubles as the global histogram: during a pass it holds every tile's
/// published aggregate or inclusive prefix per digit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WorkspaceLayout {
    pub width: KeyWidth,
    pub exclusive_bins: usize,
    pub tile_status: usize,
    pub index_copy: usize,
    pub value_copy: usize,
}

impl WorkspaceLayout {
    pub fn for_tiling(tiling: &TilingParams, width: KeyWidth) -> Self {
        match tiling.path() {
            // The fallback writes straight into the output buffers.
            SortPath::SingleCore => Self {
                width,
                exclusive_bins: 0,
                tile_status: 0,
                index_copy: 0,
                value_copy: 0,
            },
            SortPath::Onesweep => {
                let rows = tiling.rows_per_outer_iter;
                let copy = tiling.row_length * rows;

                Self {
                    width,
                    exclusive_bins: RADIX * width.passes() * rows,
                    tile_status: RADIX * tiling.tile_count * rows,
                    index_copy: copy,
                    value_copy: copy,
                }
            }
        }
    }

    pub fn byte_size<I: SortIndex>(&self) -> usize {
        (self.exclusive_bins + self.tile_status) * size_of::<AtomicU64>()
            + self.index_copy * size_of::<I>()
            + self.value_copy * self.width.bytes()
    }

    fn covers(&self, required: &WorkspaceLayout) -> bool {
        self.width == required.width
            && self.exclusive_bins >= required.exclusive_bins
            && self.tile_status >= required.tile_status
            && self.index_copy >= required.index_copy
            && self.value_copy >= required.value_copy
    }
}

pub struct Workspace<I> {
    layout: WorkspaceLayout,
    control_split: [usize; 2],
    control: Vec<AtomicU64>,
    indices: Vec<I>,
    values: KeyView,
}

pub(crate) struct WorkspaceRegions<'a, I> {
    pub bins: &'a [AtomicU64],
    pub status: &'a [AtomicU64],
    pub indices: &'a mut [I],
    pub values: &'a mut KeyView,
}

impl<I: SortIndex> Workspace<I> {
    pub fn new(tiling: &TilingParams, width: KeyWidth) -> Self {
        Self::with_layout(WorkspaceLayout::for_tiling(tiling, width))
    }

    pub fn with_layout(layout: WorkspaceLayout) -> Self {
        let control_len = layout.exclusive_bins + layout.tile_status;

        Self {
            layout,
            control_split: [layout.exclusive_bins, layout.tile_status],
            control: (0..control_len).map(|_| AtomicU64::new(0)).collect(),
            indices: vec![I::default(); layout.index_copy],
            values: KeyView::zeroed(layout.width, layout.value_copy),
        }
    }

    #[inline]
    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn check(&self, tiling: &TilingParams, width: KeyWidth) -> Result<()> {
        let required = WorkspaceLayout::for_tiling(tiling, width);

        if !self.layout.covers(&required) {
            return Err(SortError::InvalidTiling(format!(
                "workspace {:?} is smaller than the required {:?}",
                self.layout, required
            )));
        }

        Ok(())
    }

    pub(crate) fn regions(&mut self) -> WorkspaceRegions<'_, I> {
        let mut control = self.control.arbitrary_chunks_mut(&self.control_split);
        let bins: &[AtomicU64] = control.next().unwrap_or_default();
        let status: &[AtomicU64] = control.next().unwrap_or_default();

        WorkspaceRegions {
            bins,
            status,
            indices: &mut self.indices,
            values: &mut self.values,
        }
    }
}
