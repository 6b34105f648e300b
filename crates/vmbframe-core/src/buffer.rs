//! Owned native memory handed to the SDK.

use std::ptr::NonNull;

/// A heap block whose address is given to the SDK and freed explicitly.
///
/// The block is detached from Rust's borrow tracking while it exists: the
/// SDK writes into it through the raw address between enqueue and wait.
/// Slices are only produced on demand, for the duration of a borrow.
pub struct NativeBuffer {
    block: NonNull<[u8]>,
}

impl NativeBuffer {
    /// Allocate `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Self {
        let boxed: Box<[u8]> = vec![0u8; len].into_boxed_slice();
        Self {
            block: NonNull::from(Box::leak(boxed)),
        }
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start address, as stored in `VmbFrame_t::buffer`.
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.block.as_ptr() as *mut u8
    }

    /// Borrow the contents.
    ///
    /// The caller must ensure the SDK is not writing into the block, i.e.
    /// the frame is not currently queued.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `block` came from a leaked `Box<[u8]>` and is only freed in Drop.
        unsafe { std::slice::from_raw_parts(self.as_mut_ptr(), self.len()) }
    }

    /// Give up ownership without freeing. Used when the SDK may still hold
    /// the address and freeing would hand it dangling memory.
    pub fn leak(self) {
        std::mem::forget(self);
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        // SAFETY: `block` came from `Box::leak` in `zeroed` and is dropped once.
        unsafe { drop(Box::from_raw(self.block.as_ptr())) };
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("ptr", &self.as_mut_ptr())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_allocation() {
        let buf = NativeBuffer::zeroed(64);
        assert_eq!(buf.len(), 64);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_writes_through_raw_address_are_visible() {
        let buf = NativeBuffer::zeroed(4);
        // SAFETY: four bytes are allocated and nothing else borrows them.
        unsafe { std::ptr::copy_nonoverlapping([1u8, 2, 3, 4].as_ptr(), buf.as_mut_ptr(), 4) };
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_length_block() {
        let buf = NativeBuffer::zeroed(0);
        assert!(buf.is_empty());
        assert!(!buf.as_mut_ptr().is_null());
        assert!(buf.as_slice().is_empty());
    }
}
