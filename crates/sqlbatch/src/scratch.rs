//! The reusable accumulation buffer backing builder-mode batches.

use alloc::string::String;

/// Growth floor; buffers never shrink below this once grown.
const MIN_CAPACITY: usize = 4096;

/// A single growable buffer owned by the preprocessor and recycled across
/// batches and across `process` calls. Growth jumps to the next power of two
/// at or above the required capacity, with a floor of [`MIN_CAPACITY`], so
/// repeated appends amortize.
#[derive(Debug, Default)]
pub(crate) struct ScratchBuffer {
    buf: String,
}

impl ScratchBuffer {
    pub(crate) fn new() -> Self {
        Self { buf: String::new() }
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        let required = self.buf.len() + s.len();
        if self.buf.capacity() < required {
            let target = required.next_power_of_two().max(MIN_CAPACITY);
            self.buf.reserve_exact(target - self.buf.len());
        }
        self.buf.push_str(s);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Copies out the accumulated batch and resets the buffer for reuse,
    /// keeping its capacity.
    pub(crate) fn take_batch(&mut self) -> String {
        let out = self.buf.clone();
        self.buf.clear();
        out
    }

    pub(crate) fn clear(&mut self) {
        self.buf.clear();
    }
}
