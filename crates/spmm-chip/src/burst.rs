//! Channel burst geometry.
//!
//! ```text
//! lhs (sparse)  : n  (col, data) pairs per cycle
//! rhs (dense)   : 4 rows × n columns per cycle, n/4 cycles per matrix
//! out (dense)   : 4 rows × n columns per cycle, n/4 cycles per matrix
//! ```

/// Rows carried per cycle on the dense input and output channels.
pub const BURST_ROWS: usize = 4;

/// Output cells are truncated to one byte by the device.
pub const OUTPUT_MODULUS: i64 = 256;

/// Number of 4-row chunks needed to move an `n × n` dense matrix.
#[must_use]
pub const fn dense_chunks(n: usize) -> usize {
    n / BURST_ROWS
}

/// Number of elements in one dense-channel chunk.
#[must_use]
pub const fn dense_chunk_len(n: usize) -> usize {
    BURST_ROWS * n
}

/// Reduce an accumulated cell to the byte the device reports.
#[must_use]
pub const fn truncate_cell(acc: i64) -> i32 {
    // rem_euclid keeps the result in 0..256 for negative sums too
    #[allow(clippy::cast_possible_truncation)]
    let byte = acc.rem_euclid(OUTPUT_MODULUS) as i32;
    byte
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_counts() {
        assert_eq!(dense_chunks(4), 1);
        assert_eq!(dense_chunks(16), 4);
        assert_eq!(dense_chunk_len(8), 32);
    }

    #[test]
    fn truncation_wraps_into_a_byte() {
        assert_eq!(truncate_cell(255), 255);
        assert_eq!(truncate_cell(256), 0);
        assert_eq!(truncate_cell(1000), 1000 % 256);
        assert_eq!(truncate_cell(-1), 255);
    }
}
