use crate::radix_key::UnsignedKey;
use std::mem::size_of;

pub const RADIX: usize = 256;

/// Local tile buffers are padded to a multiple of this many key bytes.
pub const ALIGN_BYTES: usize = 32;

#[inline]
pub fn get_prefix_sums(counts: &[usize; 256]) -> [usize; 256] {
    let mut sums = [0usize; 256];

    let mut running_total = 0;
    for (i, c) in counts.iter().enumerate() {
        sums[i] = running_total;
        running_total += c;
    }

    sums
}

#[inline]
pub fn get_counts<U>(keys: &[U], pass: usize) -> [usize; 256]
where
    U: UnsignedKey,
{
    let mut counts_1 = [0usize; 256];
    let mut counts_2 = [0usize; 256];
    let mut counts_3 = [0usize; 256];
    let mut counts_4 = [0usize; 256];
    let chunks = keys.chunks_exact(4);
    let rem = chunks.remainder();

    chunks.into_iter().for_each(|chunk| {
        let a = chunk[0].digit(pass) as usize;
        let b = chunk[1].digit(pass) as usize;
        let c = chunk[2].digit(pass) as usize;
        let d = chunk[3].digit(pass) as usize;

        counts_1[a] += 1;
        counts_2[b] += 1;
        counts_3[c] += 1;
        counts_4[d] += 1;
    });

    rem.iter().for_each(|v| {
        let b = v.digit(pass) as usize;
        counts_1[b] += 1;
    });

    for i in 0..256 {
        counts_1[i] += counts_2[i];
        counts_1[i] += counts_3[i];
        counts_1[i] += counts_4[i];
    }

    counts_1
}

/// Counts every pass in one sweep over the keys.
#[inline]
pub fn get_all_pass_counts<U>(keys: &[U], passes: usize) -> Vec<[usize; 256]>
where
    U: UnsignedKey,
{
    let mut counts = vec![[0usize; 256]; passes];

    for k in keys {
        for (pass, c) in counts.iter_mut().enumerate() {
            c[k.digit(pass) as usize] += 1;
        }
    }

    counts
}

#[inline]
pub const fn cdiv(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

#[inline]
pub const fn round_up(a: usize, b: usize) -> usize {
    cdiv(a, b) * b
}

/// Elements of `U` per alignment block.
#[inline]
pub fn align_elements<U>() -> usize {
    (ALIGN_BYTES / size_of::<U>()).max(1)
}

#[inline]
pub fn padded_len<U>(len: usize) -> usize {
    round_up(len, align_elements::<U>())
}
