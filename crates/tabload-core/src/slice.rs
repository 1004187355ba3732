//! Row batching.
//!
//! [`slice`] partitions rows into contiguous chunks of `batch_size`. The
//! returned [`Batches`] is a single-pass iterator: it is not `Clone`, and a
//! `for` loop consumes it, so a second pass has to call [`slice`] again.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// Splits `rows` into chunks of `batch_size` rows.
///
/// Every chunk but the last holds exactly `batch_size` rows; the last holds
/// the remainder. No empty chunk is produced, so zero rows give zero chunks.
pub fn slice<T>(rows: &[T], batch_size: NonZeroUsize) -> Batches<'_, T> {
    let size = batch_size.get();
    let full = rows.len() / size;
    let count = if rows.len() % size > 0 { full + 1 } else { full };
    Batches {
        rows,
        size,
        next: 0,
        count,
    }
}

/// Lazy chunk sequence produced by [`slice`].
#[derive(Debug)]
pub struct Batches<'a, T> {
    rows: &'a [T],
    size: usize,
    next: usize,
    count: usize,
}

impl<T> Batches<'_, T> {
    /// Number of chunks the full sequence holds, consumed or not.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.count
    }
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let start = self.next * self.size;
        let end = (start + self.size).min(self.rows.len());
        self.next += 1;
        Some(&self.rows[start..end])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

impl<T> FusedIterator for Batches<'_, T> {}
