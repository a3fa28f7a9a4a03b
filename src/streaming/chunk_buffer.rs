//! Fixed-capacity FIFO that re-blocks variable-length bursts into chunks
//!
//! One buffer carries one output channel. `start == end` means empty, so at
//! most `capacity - 1` frames can be queued.

/// Circular sample queue with a fixed-size output chunk
#[derive(Debug, Clone)]
pub struct ChunkBuffer {
    data: Vec<f32>,
    chunk: Vec<f32>,
    start: usize,
    end: usize,
}

impl ChunkBuffer {
    /// Create a buffer delivering `chunk_size` frames with room for
    /// `chunk_size * chunks` frames
    pub fn new(chunk_size: usize, chunks: usize) -> Self {
        ChunkBuffer {
            data: vec![0.0; chunk_size * chunks],
            chunk: vec![0.0; chunk_size],
            start: 0,
            end: 0,
        }
    }

    /// Chunk size in frames
    pub fn chunk_size(&self) -> usize {
        self.chunk.len()
    }

    /// Total storage in frames
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Frames currently queued
    pub fn queued(&self) -> usize {
        if self.end >= self.start {
            self.end - self.start
        } else {
            self.data.len() - self.start + self.end
        }
    }

    /// Drop everything queued and clear the output chunk
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
        self.chunk.fill(0.0);
    }

    /// Append a burst.
    ///
    /// # Panics
    ///
    /// Panics if the burst would fill the buffer. The producer must drain
    /// chunks before the queue reaches capacity; overrunning it is a sizing
    /// bug, not a runtime condition.
    pub fn push(&mut self, samples: &[f32]) {
        let capacity = self.data.len();
        assert!(
            self.queued() + samples.len() < capacity,
            "chunk buffer overrun: {} queued + {} pushed, capacity {}",
            self.queued(),
            samples.len(),
            capacity
        );

        let first = samples.len().min(capacity - self.end);
        self.data[self.end..self.end + first].copy_from_slice(&samples[..first]);
        let rest = samples.len() - first;
        self.data[..rest].copy_from_slice(&samples[first..]);
        self.end = (self.end + samples.len()) % capacity;
    }

    /// True when at least one full chunk is queued
    pub fn has_full_chunk(&self) -> bool {
        self.queued() >= self.chunk.len()
    }

    /// Shift the output chunk left by `shift_by` frames and refill the
    /// freed tail from the queue.
    ///
    /// `shift_by == chunk_size` replaces the whole chunk. Returns `None` when
    /// fewer than `shift_by` frames are queued; the chunk is left untouched.
    pub fn take_chunk(&mut self, shift_by: usize) -> Option<&[f32]> {
        let size = self.chunk.len();
        let shift_by = shift_by.min(size);
        if self.queued() < shift_by {
            return None;
        }

        self.chunk.copy_within(shift_by.., 0);
        for i in size - shift_by..size {
            self.chunk[i] = self.pop();
        }
        Some(&self.chunk)
    }

    /// Current output chunk
    pub fn chunk(&self) -> &[f32] {
        &self.chunk
    }

    /// Move up to `out.len()` queued frames into `out`, returning how many
    /// were written
    pub fn drain_into(&mut self, out: &mut [f32]) -> usize {
        let n = self.queued().min(out.len());
        for dest in out.iter_mut().take(n) {
            *dest = self.pop();
        }
        n
    }

    fn pop(&mut self) -> f32 {
        let value = self.data[self.start];
        self.start = (self.start + 1) % self.data.len();
        value
    }
}
