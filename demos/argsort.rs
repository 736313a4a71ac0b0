use nanorand::{Rng, WyRand};
use radix_argsort::tuners::FixedTileTuner;
use radix_argsort::SortWithIndex;
use std::time::Instant;

fn main() {
    let n = 10_000_000;
    let mut rng = WyRand::new();
    let inputs: Vec<f32> = (0..n)
        .map(|_| rng.generate::<u32>() as f32 / u32::MAX as f32 - 0.5)
        .collect();

    let start = Instant::now();
    let sorted = inputs.argsort().unwrap();
    println!("argsort of {} f32: {:?}", n, start.elapsed());
    println!(
        "min {} at {}, max {} at {}",
        sorted.values[0],
        sorted.indices[0],
        sorted.values[n - 1],
        sorted.indices[n - 1]
    );

    let start = Instant::now();
    let rows = inputs
        .sort_with_index_builder()
        .with_row_length(10_000)
        .with_descending()
        .with_tuner(&FixedTileTuner::new(1_024))
        .sort()
        .unwrap();
    println!("1000 descending rows: {:?}", start.elapsed());
    println!("row 0 top 3: {:?}", &rows.values[..3]);
}
