//! Ring Queue Implementation

/// Fixed-capacity circular byte queue.
///
/// One backing slot beyond `capacity` stays reserved so that `head == tail`
/// always means empty. Callers therefore get the full `capacity` bytes of
/// usable space. There is no interior locking; instances are expected to sit
/// behind the owner's critical section when shared across threads.
pub struct RingQueue {
    /// Backing storage, `capacity + 1` bytes
    storage: Box<[u8]>,
    /// Read cursor
    head: usize,
    /// Write cursor
    tail: usize,
}

impl RingQueue {
    /// Create a queue holding up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity + 1].into_boxed_slice(),
            head: 0,
            tail: 0,
        }
    }

    /// Usable capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len() - 1
    }

    /// Number of bytes currently occupied.
    pub fn len(&self) -> usize {
        // (tail - head) mod storage size
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.storage.len() - self.head + self.tail
        }
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Free space in bytes.
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Enqueue a block of bytes.
    ///
    /// Returns `false` without mutating anything if `data` does not fit in
    /// the free space. Partial writes never happen; on success the write
    /// cursor advances by exactly `data.len()`.
    pub fn enqueue(&mut self, data: &[u8]) -> bool {
        if data.len() > self.free() {
            return false;
        }

        let cap = self.storage.len();
        let first = data.len().min(cap - self.tail);
        self.storage[self.tail..self.tail + first].copy_from_slice(&data[..first]);
        if first < data.len() {
            // wrapped around the end of the backing storage
            self.storage[..data.len() - first].copy_from_slice(&data[first..]);
        }
        self.tail = (self.tail + data.len()) % cap;
        true
    }

    /// Dequeue exactly `out.len()` bytes into `out`.
    ///
    /// Returns `false` without mutating anything if fewer than `out.len()`
    /// bytes are occupied.
    pub fn dequeue(&mut self, out: &mut [u8]) -> bool {
        if out.len() > self.len() {
            return false;
        }

        let cap = self.storage.len();
        let first = out.len().min(cap - self.head);
        out[..first].copy_from_slice(&self.storage[self.head..self.head + first]);
        let rest = out.len() - first;
        if rest > 0 {
            out[first..].copy_from_slice(&self.storage[..rest]);
        }
        self.head = (self.head + out.len()) % cap;
        true
    }

    /// Dequeue a single byte, the pumps' unit of transfer.
    pub fn dequeue_byte(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.storage[self.head];
        self.head = (self.head + 1) % self.storage.len();
        Some(byte)
    }
}
