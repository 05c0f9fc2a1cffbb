//! Vector-like storage that grows in fixed-size chunks ("segments") instead
//! of a single reallocated buffer. Unlike [`Vec`], a `SegmentedVector` never
//! moves previously written elements when it grows: each segment, once
//! allocated, keeps its capacity for the rest of the vector's life, so
//! indices handed out earlier keep referring to the same storage.

const SEGMENT_BYTES: usize = 8192;

fn segment_elements<T>() -> usize {
    (SEGMENT_BYTES / std::mem::size_of::<T>().max(1)).max(1)
}

#[derive(Debug)]
pub struct SegmentedVector<T> {
    segments: Vec<Vec<T>>,
    len: usize,
}

impl<T> Default for SegmentedVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SegmentedVector<T> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn segment_and_offset(index: usize) -> (usize, usize) {
        let elements = segment_elements::<T>();
        (index / elements, index % elements)
    }

    /// Panics (a fatal, not recoverable condition per the component
    /// contract) if `index` is out of range.
    pub fn get(&self, index: usize) -> &T {
        assert!(index < self.len, "SegmentedVector index out of range");
        let (segment, offset) = Self::segment_and_offset(index);
        &self.segments[segment][offset]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.len, "SegmentedVector index out of range");
        let (segment, offset) = Self::segment_and_offset(index);
        &mut self.segments[segment][offset]
    }

    pub fn push_back(&mut self, value: T) {
        let elements = segment_elements::<T>();
        let (segment, offset) = Self::segment_and_offset(self.len);
        if segment == self.segments.len() {
            self.segments.push(Vec::with_capacity(elements));
        }
        debug_assert_eq!(self.segments[segment].len(), offset);
        self.segments[segment].push(value);
        self.len += 1;
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let (segment, _) = Self::segment_and_offset(self.len - 1);
        self.len -= 1;
        self.segments[segment].pop()
    }

    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        while self.len > new_len {
            self.pop_back();
        }
        while self.len < new_len {
            self.push_back(value.clone());
        }
    }
}

/// A variant for compactly storing many fixed-size arrays whose length is
/// only known at runtime.
#[derive(Debug)]
pub struct SegmentedArrayVector<T> {
    storage: SegmentedVector<T>,
    arity: usize,
}

impl<T: Clone> SegmentedArrayVector<T> {
    pub fn new(arity: usize) -> Self {
        Self {
            storage: SegmentedVector::new(),
            arity,
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len() / self.arity.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_back(&mut self, array: &[T]) {
        assert_eq!(array.len(), self.arity);
        for value in array {
            self.storage.push_back(value.clone());
        }
    }

    /// Copies out the array stored at `index`. Rows are not guaranteed to be
    /// contiguous in memory (they may straddle a segment boundary), so this
    /// returns an owned copy rather than a slice.
    pub fn row(&self, index: usize) -> Vec<T> {
        let start = index * self.arity;
        (0..self.arity).map(|i| self.storage.get(start + i).clone()).collect()
    }
}
