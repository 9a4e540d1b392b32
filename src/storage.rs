//! Flat, named byte-blob storage
//!
//! Animations live under [`ANIMATIONS_DIR`] in whatever filesystem the board
//! mounts. The core only needs open/read/seek/size plus existence checks and a
//! directory walk, expressed by [`Storage`] and [`StorageFile`].

use core::fmt;

use heapless::{String, Vec};

/// Directory prefix for user-uploaded animations
pub const ANIMATIONS_DIR: &str = "/anims/";

/// Upper bound for a sanitized upload file name
pub const MAX_FILE_NAME_LEN: usize = 32;

/// Storage-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No blob with the requested name exists
    NotFound,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
        }
    }
}

/// An open, seekable blob
///
/// Dropping the value closes the underlying handle.
pub trait StorageFile {
    /// Total size in bytes
    fn size(&self) -> u32;

    /// Read up to `buf.len()` bytes, returning 0 at end of file
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Move the read cursor to an absolute position within `0..=size`
    fn seek(&mut self, position: u32);
}

/// Named blob storage service
pub trait Storage {
    type File: StorageFile;

    /// Open a blob for reading
    fn open(&mut self, path: &str) -> Option<Self::File>;

    /// Check whether a blob exists
    fn exists(&self, path: &str) -> bool;

    /// Visit every entry directly below `dir` with its full path and size
    fn list(&self, dir: &str, visit: &mut dyn FnMut(&str, u32));
}

/// Read-only storage over byte slices linked into the firmware image
///
/// Useful for built-in animations (`include_bytes!`) and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticStorage<'a, const N: usize> {
    entries: Vec<(&'a str, &'a [u8]), N>,
}

impl<'a, const N: usize> StaticStorage<'a, N> {
    /// Create an empty storage
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a blob under `path`
    ///
    /// Returns the entry back if the storage is full.
    pub fn insert(&mut self, path: &'a str, data: &'a [u8]) -> Result<(), (&'a str, &'a [u8])> {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == path) {
            entry.1 = data;
            return Ok(());
        }
        self.entries.push((path, data))
    }

    /// Remove a blob, returning whether it existed
    pub fn remove(&mut self, path: &str) -> bool {
        match self.entries.iter().position(|(name, _)| *name == path) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

impl<'a, const N: usize> Storage for StaticStorage<'a, N> {
    type File = SliceFile<'a>;

    fn open(&mut self, path: &str) -> Option<Self::File> {
        self.entries
            .iter()
            .find(|(name, _)| *name == path)
            .map(|&(_, data)| SliceFile::new(data))
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == path)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn list(&self, dir: &str, visit: &mut dyn FnMut(&str, u32)) {
        for (name, data) in &self.entries {
            let Some(rest) = name.strip_prefix(dir) else {
                continue;
            };
            if rest.is_empty() || rest.contains('/') {
                continue;
            }
            visit(name, data.len() as u32);
        }
    }
}

/// Cursor over an in-memory blob
#[derive(Debug, Clone)]
pub struct SliceFile<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceFile<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl StorageFile for SliceFile<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn size(&self) -> u32 {
        self.data.len() as u32
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let remaining = &self.data[self.position.min(self.data.len())..];
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        count
    }

    fn seek(&mut self, position: u32) {
        self.position = (position as usize).min(self.data.len());
    }
}

/// Turn a user-supplied upload name into a safe animation file name
///
/// Keeps ASCII letters, digits, `-`, `_` and `.`; falls back to `animation`
/// when nothing survives, forces a `.gif` suffix and never starts with a dot.
/// Over-long names are cut so the suffix always fits.
pub fn sanitize_file_name(name: &str) -> String<MAX_FILE_NAME_LEN> {
    const FALLBACK: &str = "animation";
    const SUFFIX: &str = ".gif";

    let mut body: String<MAX_FILE_NAME_LEN> = String::new();
    for c in name.trim().chars() {
        let allowed = c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
        if !allowed {
            continue;
        }
        if c == '.' && body.is_empty() {
            let _ = body.push_str(FALLBACK);
        }
        if body.len() + 1 + SUFFIX.len() > MAX_FILE_NAME_LEN {
            break;
        }
        let _ = body.push(c);
    }
    if body.is_empty() {
        let _ = body.push_str(FALLBACK);
    }

    let has_suffix = body.len() >= SUFFIX.len()
        && body[body.len() - SUFFIX.len()..].eq_ignore_ascii_case(SUFFIX);
    if !has_suffix {
        let _ = body.push_str(SUFFIX);
    }
    body
}

/// Strip directory and extension from a stored path (`/anims/happy.gif` -> `happy`)
pub fn display_name(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    }
}
