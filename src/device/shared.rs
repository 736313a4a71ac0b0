use std::marker::PhantomData;
use std::ptr;

/// A slice that several cores of one launch write into at disjoint positions.
///
/// Each pass reads one ping-pong half and scatters into the other. Within a pass every
/// destination position is written exactly once, and a device barrier separates the
/// writes of one pass from the reads of the next.
pub struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<'a, T: Send> Send for SharedSlice<'a, T> {}
unsafe impl<'a, T: Send> Sync for SharedSlice<'a, T> {}

impl<'a, T: Copy> SharedSlice<'a, T> {
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// No core may write `offset..offset + dst.len()` until the next barrier.
    #[inline]
    pub unsafe fn read_into(&self, offset: usize, dst: &mut [T]) {
        assert!(offset + dst.len() <= self.len);
        ptr::copy_nonoverlapping(self.ptr.add(offset), dst.as_mut_ptr(), dst.len());
    }

    /// # Safety
    ///
    /// `index` must not be read or written by any other core until the next barrier.
    #[inline]
    pub unsafe fn write(&self, index: usize, value: T) {
        assert!(index < self.len);
        self.ptr.add(index).write(value);
    }
}
