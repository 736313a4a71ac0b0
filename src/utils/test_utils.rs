use crate::radix_key::{RadixKey, SortIndex};
use crate::tuner::Tuner;
use crate::{SortWithIndex, SortedWithIndex};
use block_pseudorand::block_rand;
use nanorand::{Rng, WyRand};
use std::fmt::Debug;

pub trait NumericTest: RadixKey + Sized + Copy + Debug + PartialEq + Send + Sync {}

impl<T> NumericTest for T where T: RadixKey + Sized + Copy + Debug + PartialEq + Send + Sync {}

/// Random keys where `dups` bounds the number of distinct values (none for full range).
pub fn gen_inputs<T>(n: usize, dups: Option<usize>) -> Vec<T>
where
    T: NumericTest + Clone,
{
    let inputs: Vec<T> = block_rand(n);

    match dups {
        None => inputs,
        Some(distinct) => {
            let pool: Vec<T> = inputs.iter().take(distinct.max(1)).copied().collect();
            let mut rng = WyRand::new_seed(n as u64);
            (0..n)
                .map(|_| pool[rng.generate_range(0..pool.len())])
                .collect()
        }
    }
}

/// Stable sort of each row by twiddled key, with identity (or preset) indices.
pub fn reference_sort<T, I>(
    values: &[T],
    row_length: usize,
    preset: Option<&[i32]>,
    descending: bool,
) -> SortedWithIndex<T, I>
where
    T: NumericTest,
    I: SortIndex,
{
    let mut out = SortedWithIndex {
        values: Vec::with_capacity(values.len()),
        indices: Vec::with_capacity(values.len()),
    };

    if row_length == 0 {
        return out;
    }

    for (r, row) in values.chunks(row_length).enumerate() {
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by_key(|&i| row[i].twiddle_in(descending));

        for i in order {
            out.values.push(row[i]);
            out.indices.push(match preset {
                Some(p) => I::from_preset(p[r * row_length + i]),
                None => I::from_position(i),
            });
        }
    }

    out
}

fn same_bits<T: NumericTest>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.twiddle_in(false) == y.twiddle_in(false))
}

/// Checks permutation, order, gather consistency and stability against the reference.
pub fn validate_sort<T, I>(
    values: &[T],
    row_length: usize,
    descending: bool,
    sorted: &SortedWithIndex<T, I>,
) where
    T: NumericTest,
    I: SortIndex,
{
    assert_eq!(sorted.values.len(), values.len());
    assert_eq!(sorted.indices.len(), values.len());

    if row_length == 0 {
        return;
    }

    for (r, ((row, out), idx)) in values
        .chunks(row_length)
        .zip(sorted.values.chunks(row_length))
        .zip(sorted.indices.chunks(row_length))
        .enumerate()
    {
        let mut seen = vec![false; row.len()];
        for (o, i) in out.iter().zip(idx) {
            let pos = i.to_position();
            assert!(pos < row.len(), "row {}: index {:?} out of range", r, i);
            assert!(!seen[pos], "row {}: index {} emitted twice", r, pos);
            seen[pos] = true;

            assert_eq!(
                o.twiddle_in(false),
                row[pos].twiddle_in(false),
                "row {}: value does not match its index",
                r
            );
        }

        for w in out.windows(2) {
            assert!(w[0].twiddle_in(descending) <= w[1].twiddle_in(descending));
        }
    }

    let expected: SortedWithIndex<T, I> = reference_sort(values, row_length, None, descending);
    assert!(same_bits(&sorted.values, &expected.values));
    assert_eq!(sorted.indices, expected.indices);
}

pub fn sort_with<T, I>(
    values: &[T],
    row_length: usize,
    descending: bool,
    cores: usize,
    tuner: &(dyn Tuner + Send + Sync),
) -> SortedWithIndex<T, I>
where
    T: NumericTest,
    I: SortIndex,
{
    let builder = values
        .sort_with_index_builder()
        .with_row_length(row_length)
        .with_max_cores(cores)
        .with_tuner(tuner)
        .with_index_type::<I>();

    let builder = if descending {
        builder.with_descending()
    } else {
        builder
    };

    builder.sort().unwrap()
}

pub fn sort_comparison_suite<T>(tuner: &(dyn Tuner + Send + Sync), cores: usize)
where
    T: NumericTest,
{
    let cases: [(usize, usize, Option<usize>); 6] = [
        (1, 1, None),
        (5, 3, Some(2)),
        (1_000, 1, None),
        (4_097, 2, Some(40)),
        (20_000, 1, None),
        (9_000, 3, Some(1)),
    ];

    for (row_length, rows, dups) in cases {
        let values: Vec<T> = gen_inputs(row_length * rows, dups);

        for descending in [false, true] {
            let sorted: SortedWithIndex<T, i32> = sort_with(&values, row_length, descending, cores, tuner);
            validate_sort(&values, row_length, descending, &sorted);
        }
    }
}
