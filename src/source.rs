//! Single-slot seekable byte source backed by storage
//!
//! The playback pipeline keeps exactly one file open at a time. [`ByteSource`]
//! is that reusable slot; [`OpenSource`] is the scoped handle returned by
//! [`ByteSource::open`] which closes the slot when it goes out of scope, so
//! every exit path of a playback attempt releases the file.

use core::ops::{Deref, DerefMut};

use crate::storage::{Storage, StorageError, StorageFile};

/// Reusable slot holding at most one open file
#[derive(Debug)]
pub struct ByteSource<F: StorageFile> {
    slot: Option<F>,
}

impl<F: StorageFile> ByteSource<F> {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Open `name`, closing whatever the slot held before
    pub fn open<S>(&mut self, storage: &mut S, name: &str) -> Result<OpenSource<'_, F>, StorageError>
    where
        S: Storage<File = F>,
    {
        self.close();
        let file = storage.open(name).ok_or(StorageError::NotFound)?;
        self.slot = Some(file);
        Ok(OpenSource { source: self })
    }

    /// Check if a file is currently open
    pub const fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// Size of the open file in bytes, 0 when closed
    pub fn size(&self) -> u32 {
        self.slot.as_ref().map_or(0, StorageFile::size)
    }

    /// Read into `buf`, returning 0 at end of file or when closed
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.slot.as_mut().map_or(0, |file| file.read(buf))
    }

    /// Seek to an absolute position
    ///
    /// Negative positions clamp to 0 and positions past the end clamp to the
    /// file size. Returns the position actually reached.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn seek(&mut self, position: i64) -> u32 {
        let Some(file) = self.slot.as_mut() else {
            return 0;
        };
        let clamped = position.clamp(0, i64::from(file.size())) as u32;
        file.seek(clamped);
        clamped
    }

    /// Close the open file, if any. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.slot = None;
    }
}

impl<F: StorageFile> Default for ByteSource<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped handle to the file held by a [`ByteSource`]
///
/// Closes the file on drop.
pub struct OpenSource<'a, F: StorageFile> {
    source: &'a mut ByteSource<F>,
}

impl<F: StorageFile> Deref for OpenSource<'_, F> {
    type Target = ByteSource<F>;

    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl<F: StorageFile> DerefMut for OpenSource<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.source
    }
}

impl<F: StorageFile> Drop for OpenSource<'_, F> {
    fn drop(&mut self) {
        self.source.close();
    }
}
