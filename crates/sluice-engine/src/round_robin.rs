//! Rotating start offset into the sink list.

/// Round-robin allocator state.
///
/// Holds only a starting offset. Distribution visits sinks from the
/// offset, wrapping once; each sink that accepts resources on commit moves
/// the offset forward by one. Over many ticks equal-priority sinks take
/// turns being first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundRobin {
    offset: usize,
}

impl RoundRobin {
    /// Allocator starting at `offset`.
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Raw stored offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Effective start index for a list of `len` sinks.
    pub fn start(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.offset % len
        }
    }

    /// Sink indices in visiting order: `start, start+1, …`, wrapping once.
    pub fn order(&self, len: usize) -> impl Iterator<Item = usize> {
        let start = self.start(len);
        (0..len).map(move |j| (j + start) % len)
    }

    /// Credit one successful commit.
    pub fn advance(&mut self, len: usize) {
        if len > 0 {
            self.offset = (self.start(len) + 1) % len;
        }
    }

    /// Bring the stored offset into `[0, len)`, e.g. after the sink list
    /// was rebuilt shorter, or after restoring persisted state.
    pub fn normalize(&mut self, len: usize) {
        self.offset = self.start(len);
    }
}
