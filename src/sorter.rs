use crate::device::{Device, SpinPolicy, Workspace, WorkspaceRegions};
use crate::key_view::{twiddle_into_view, untwiddle_from_view, KeyView};
use crate::radix_key::{RadixKey, SortIndex, UnsignedKey};
use crate::sorts::bitonic_sort::bitonic_sort;
use crate::sorts::onesweep_sort::onesweep_sort;
use crate::sorts::SortBuffers;
use crate::tiling::{SortPath, TilingParams};
use crate::{Result, SortError};
use log::debug;

/// Drives one sort-with-index call: validates shapes, twiddles keys into their unsigned
/// view, dispatches on key width and path, and untwiddles the result.
pub struct Sorter {
    device: Device,
    policy: SpinPolicy,
}

fn expect_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SortError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }

    Ok(())
}

impl Sorter {
    /// Builds a device for `tiling`. The radix path gets exactly the cores it launches; the
    /// single-core path never needs co-resident cores, so its pool is capped at rayon's
    /// thread count.
    pub fn new(tiling: &TilingParams, policy: SpinPolicy) -> Result<Self> {
        let cores = match tiling.path() {
            SortPath::SingleCore => tiling.launch_cores().min(rayon::current_num_threads()),
            SortPath::Onesweep => tiling.launch_cores(),
        };

        Ok(Self {
            device: Device::new(cores)?,
            policy,
        })
    }

    pub fn sort<T, I>(
        &self,
        values: &[T],
        preset: Option<&[i32]>,
        sorted_values: &mut [T],
        sorted_indices: &mut [I],
        workspace: &mut Workspace<I>,
        tiling: &TilingParams,
    ) -> Result<()>
    where
        T: RadixKey,
        I: SortIndex,
    {
        tiling.check()?;

        let total = tiling.total_len();
        expect_len("values", total, values.len())?;
        expect_len("sorted values", total, sorted_values.len())?;
        expect_len("sorted indices", total, sorted_indices.len())?;
        if let Some(p) = preset {
            expect_len("preset indices", total, p.len())?;
        }

        if total == 0 {
            return Ok(());
        }

        if tiling.row_length > I::MAX_ROW_LENGTH {
            return Err(SortError::IndexOverflow {
                row_length: tiling.row_length,
            });
        }

        let width = T::Unsigned::WIDTH;
        workspace.check(tiling, width)?;

        let descending = tiling.descending;
        let input = self
            .device
            .install(|| twiddle_into_view(values, descending));
        let mut output = KeyView::zeroed(width, total);

        self.sort_view(&input, preset, &mut output, sorted_indices, workspace, tiling)?;

        self.device
            .install(|| untwiddle_from_view(&output, sorted_values, descending))
    }

    /// Sorts already twiddled keys. All three key buffers must share one width.
    pub fn sort_view<I>(
        &self,
        input: &KeyView,
        preset: Option<&[i32]>,
        output: &mut KeyView,
        indices: &mut [I],
        workspace: &mut Workspace<I>,
        tiling: &TilingParams,
    ) -> Result<()>
    where
        I: SortIndex,
    {
        let WorkspaceRegions {
            bins,
            status,
            indices: index_copy,
            values: key_copy,
        } = workspace.regions();

        debug!(
            "sorting {} rows of {} ({:?} keys) via {:?}",
            tiling.row_count,
            tiling.row_length,
            input.width(),
            tiling.path()
        );

        match (input, output, key_copy) {
            (KeyView::B8(i), KeyView::B8(o), KeyView::B8(w)) => self.sort_keys(
                tiling,
                SortBuffers {
                    input: i,
                    preset,
                    keys: o,
                    indices,
                    key_copy: w,
                    index_copy,
                    bins,
                    status,
                },
            ),
            (KeyView::B16(i), KeyView::B16(o), KeyView::B16(w)) => self.sort_keys(
                tiling,
                SortBuffers {
                    input: i,
                    preset,
                    keys: o,
                    indices,
                    key_copy: w,
                    index_copy,
                    bins,
                    status,
                },
            ),
            (KeyView::B32(i), KeyView::B32(o), KeyView::B32(w)) => self.sort_keys(
                tiling,
                SortBuffers {
                    input: i,
                    preset,
                    keys: o,
                    indices,
                    key_copy: w,
                    index_copy,
                    bins,
                    status,
                },
            ),
            (KeyView::B64(i), KeyView::B64(o), KeyView::B64(w)) => self.sort_keys(
                tiling,
                SortBuffers {
                    input: i,
                    preset,
                    keys: o,
                    indices,
                    key_copy: w,
                    index_copy,
                    bins,
                    status,
                },
            ),
            _ => Err(SortError::WidthMismatch),
        }
    }

    fn sort_keys<U, I>(&self, tiling: &TilingParams, buffers: SortBuffers<'_, U, I>) -> Result<()>
    where
        U: UnsignedKey,
        I: SortIndex,
    {
        match tiling.path() {
            SortPath::SingleCore => bitonic_sort(&self.device, tiling, buffers),
            SortPath::Onesweep => onesweep_sort(&self.device, self.policy, tiling, buffers),
        }
    }
}
