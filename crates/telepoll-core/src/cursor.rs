//! Polling offset.

use crate::types::Update;

/// The lowest update id not yet acknowledged.
///
/// Passing this value as `offset` to `getUpdates` confirms every update
/// below it, so the server never sends them again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    next_offset: i64,
}

impl Cursor {
    pub fn new(start: i64) -> Self {
        Self {
            next_offset: start.max(0),
        }
    }

    pub fn next_offset(&self) -> i64 {
        self.next_offset
    }

    /// Move past every update in `batch`. The batch need not be sorted.
    ///
    /// Never moves backwards; an empty batch leaves the cursor unchanged.
    pub fn advance(&mut self, batch: &[Update]) {
        if let Some(max_id) = batch.iter().map(|u| u.id).max() {
            self.next_offset = self.next_offset.max(max_id + 1);
        }
    }

    /// Raise the cursor to `offset` if it is ahead (e.g. a stored offset).
    pub fn fast_forward(&mut self, offset: i64) {
        self.next_offset = self.next_offset.max(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[i64]) -> Vec<Update> {
        ids.iter().copied().map(Update::new).collect()
    }

    #[test]
    fn test_default_starts_at_zero() {
        assert_eq!(Cursor::default().next_offset(), 0);
    }

    #[test]
    fn test_negative_start_clamped() {
        assert_eq!(Cursor::new(-3).next_offset(), 0);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut cursor = Cursor::new(17);
        cursor.advance(&[]);
        assert_eq!(cursor.next_offset(), 17);
    }

    #[test]
    fn test_advance_uses_max_id_regardless_of_order() {
        let mut cursor = Cursor::default();
        cursor.advance(&batch(&[5, 7, 6]));
        assert_eq!(cursor.next_offset(), 8);
    }

    #[test]
    fn test_advance_never_decreases() {
        let mut cursor = Cursor::new(100);
        cursor.advance(&batch(&[3, 4]));
        assert_eq!(cursor.next_offset(), 100);

        cursor.advance(&batch(&[100]));
        assert_eq!(cursor.next_offset(), 101);
    }

    #[test]
    fn test_fast_forward() {
        let mut cursor = Cursor::new(10);
        cursor.fast_forward(5);
        assert_eq!(cursor.next_offset(), 10);
        cursor.fast_forward(50);
        assert_eq!(cursor.next_offset(), 50);
    }
}
