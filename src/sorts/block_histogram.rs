use crate::radix_key::UnsignedKey;
use crate::utils::{get_counts, get_prefix_sums};

/// Digit statistics of one tile for one pass.
pub struct BlockHistogram {
    pub counts: [usize; 256],
    /// Start of each digit's run in the tile's locally sorted order.
    pub exclusive: [usize; 256],
    /// For each real element, how many earlier elements of the tile share its digit.
    pub ranks: Vec<usize>,
}

impl BlockHistogram {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: [0; 256],
            exclusive: [0; 256],
            ranks: Vec::with_capacity(capacity),
        }
    }

    /// `keys` is the padded tile, of which the first `len` entries are real.
    pub fn compute<U>(&mut self, keys: &[U], len: usize, pass: usize)
    where
        U: UnsignedKey,
    {
        self.counts = get_counts(keys, pass);
        // Padding is U::MAX, which is digit 255 in every pass.
        self.counts[255] -= keys.len() - len;
        self.exclusive = get_prefix_sums(&self.counts);

        let mut running = [0usize; 256];
        self.ranks.clear();
        self.ranks.extend(keys[..len].iter().map(|k| {
            let d = k.digit(pass) as usize;
            let r = running[d];
            running[d] += 1;
            r
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_padding_excluded() {
        let mut keys = vec![0x01ffu16, 0x02ff, 0x0003, 0x0103];
        keys.resize(16, u16::MAX);
        let mut h = BlockHistogram::with_capacity(16);

        h.compute(&keys, 4, 0);
        assert_eq!(h.counts[0xff], 2);
        assert_eq!(h.counts[0x03], 2);
        assert_eq!(h.counts.iter().sum::<usize>(), 4);
        assert_eq!(h.exclusive[0xff], 2);
        assert_eq!(h.ranks, vec![0, 1, 0, 1]);

        h.compute(&keys, 4, 1);
        assert_eq!(h.counts[0x00], 1);
        assert_eq!(h.counts[0x01], 2);
        assert_eq!(h.counts[0x02], 1);
        assert_eq!(h.ranks, vec![0, 0, 0, 1]);
    }
}
