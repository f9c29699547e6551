//! Input generators shared by the benchmarks.

/// `rows` lines of `cols` comma-separated values from a fixed LCG, with a
/// missing value in roughly one cell of forty.
pub fn generate_csv(rows: usize, cols: usize, seed: u64) -> String {
    let mut state = seed;
    let mut out = String::with_capacity(rows * cols * 10);
    for _ in 0..rows {
        for c in 0..cols {
            if c > 0 {
                out.push(',');
            }
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let frac = ((state >> 33) as f64) / (u32::MAX as f64 / 2.0);
            if frac < 0.025 {
                continue;
            }
            out.push_str(&format!("{:.4}", 100.0 * c as f64 + 1000.0 * frac));
        }
        out.push('\n');
    }
    out
}
