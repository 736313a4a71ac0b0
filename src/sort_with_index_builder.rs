use crate::device::{SpinPolicy, Workspace};
use crate::radix_key::{RadixKey, SortIndex, UnsignedKey};
use crate::sorter::Sorter;
use crate::tiling::SortShape;
use crate::tuner::Tuner;
use crate::tuners::{SingleCoreTuner, StandardTuner};
use crate::{Result, SortError};
use std::marker::PhantomData;
use std::time::Duration;

/// The sorted copy of the values and, for each output slot, the row position its value
/// came from (or the preset index that travelled with it).
#[derive(Debug, Clone, PartialEq)]
pub struct SortedWithIndex<T, I> {
    pub values: Vec<T>,
    pub indices: Vec<I>,
}

pub struct SortWithIndexBuilder<'a, T, I = i32> {
    values: &'a [T],
    preset: Option<&'a [i32]>,
    row_length: Option<usize>,
    descending: bool,
    max_cores: usize,
    tuner: &'a (dyn Tuner + Send + Sync),
    policy: SpinPolicy,
    _index: PhantomData<I>,
}

impl<'a, T> SortWithIndexBuilder<'a, T, i32>
where
    T: RadixKey,
{
    pub(crate) fn new(values: &'a [T]) -> Self {
        Self {
            values,
            preset: None,
            row_length: None,
            descending: false,
            max_cores: rayon::current_num_threads(),
            tuner: &StandardTuner,
            policy: SpinPolicy::default(),
            _index: PhantomData,
        }
    }
}

impl<'a, T, I> SortWithIndexBuilder<'a, T, I>
where
    T: RadixKey,
    I: SortIndex,
{
    pub fn with_descending(mut self) -> Self {
        self.descending = true;

        self
    }

    pub fn with_ascending(mut self) -> Self {
        self.descending = false;

        self
    }

    /// Sorts every consecutive `row_length` values independently. Defaults to one row.
    pub fn with_row_length(mut self, row_length: usize) -> Self {
        self.row_length = Some(row_length);

        self
    }

    /// Carries these indices through the sort instead of generating row positions.
    pub fn with_preset_indices(mut self, preset: &'a [i32]) -> Self {
        self.preset = Some(preset);

        self
    }

    pub fn with_max_cores(mut self, cores: usize) -> Self {
        self.max_cores = cores.max(1);

        self
    }

    pub fn with_tuner(mut self, tuner: &'a (dyn Tuner + Send + Sync)) -> Self {
        self.tuner = tuner;

        self
    }

    pub fn with_single_core_tuner(mut self) -> Self {
        self.tuner = &SingleCoreTuner;

        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.policy = SpinPolicy::with_deadline(deadline);

        self
    }

    pub fn without_deadline(mut self) -> Self {
        self.policy = SpinPolicy::unbounded();

        self
    }

    pub fn with_index_type<J: SortIndex>(self) -> SortWithIndexBuilder<'a, T, J> {
        SortWithIndexBuilder {
            values: self.values,
            preset: self.preset,
            row_length: self.row_length,
            descending: self.descending,
            max_cores: self.max_cores,
            tuner: self.tuner,
            policy: self.policy,
            _index: PhantomData,
        }
    }

    fn shape(&self) -> Result<SortShape> {
        let len = self.values.len();
        let row_length = self.row_length.unwrap_or(len);

        let row_count = match row_length {
            0 if len == 0 => 0,
            0 => {
                return Err(SortError::ShapeMismatch {
                    what: "values",
                    expected: 0,
                    actual: len,
                })
            }
            n if len % n != 0 => {
                return Err(SortError::ShapeMismatch {
                    what: "values",
                    expected: (len / n + 1) * n,
                    actual: len,
                })
            }
            n => len / n,
        };

        Ok(SortShape {
            row_length,
            row_count,
            width: T::Unsigned::WIDTH,
            descending: self.descending,
            available_cores: self.max_cores,
        })
    }

    pub fn sort(self) -> Result<SortedWithIndex<T, I>> {
        let len = self.values.len();
        let mut out = SortedWithIndex {
            values: self.values.to_vec(),
            indices: vec![I::default(); len],
        };

        self.sort_into(&mut out.values, &mut out.indices)?;

        Ok(out)
    }

    pub fn sort_into(self, sorted_values: &mut [T], sorted_indices: &mut [I]) -> Result<()> {
        let shape = self.shape()?;

        if shape.row_count == 0 || shape.row_length == 0 {
            return Ok(());
        }

        let tiling = self.tuner.plan(&shape);
        let mut workspace = Workspace::new(&tiling, shape.width);
        let sorter = Sorter::new(&tiling, self.policy)?;

        sorter.sort(
            self.values,
            self.preset,
            sorted_values,
            sorted_indices,
            &mut workspace,
            &tiling,
        )
    }
}
