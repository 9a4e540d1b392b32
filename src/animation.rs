//! Animation playback
//!
//! One playback attempt opens the selected file, streams its first frame
//! through the compositor onto the panel and closes the file again, whatever
//! the outcome.

use core::fmt;

#[cfg(feature = "esp32-log")]
use esp_println::println;
use heapless::{String, Vec};

use crate::PixelSink;
use crate::color::ColorTable;
use crate::compositor::composite;
use crate::decoder::{DecodeError, FrameDecoder, FrameInfo};
use crate::emotion::{AnimationId, MAX_ANIMATION_PATH_LEN};
use crate::source::ByteSource;
use crate::storage::{ANIMATIONS_DIR, Storage, StorageError, display_name};

/// Why a playback attempt drew nothing (or only part of a frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    /// The animation file does not exist; the panel is untouched
    NotFound,
    /// The file is not a decodable GIF; lines drawn before the error stay
    CorruptStream(DecodeError),
}

impl From<StorageError> for PlaybackError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
        }
    }
}

impl From<DecodeError> for PlaybackError {
    fn from(err: DecodeError) -> Self {
        Self::CorruptStream(err)
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("animation not found"),
            Self::CorruptStream(err) => write!(f, "corrupt animation: {}", err),
        }
    }
}

/// A playable animation found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationInfo {
    /// File name without directory and extension
    pub name: String<MAX_ANIMATION_PATH_LEN>,
    /// Full storage path
    pub path: AnimationId,
}

/// Plays stored GIF animations onto the LED matrix
pub struct AnimationManager<S: Storage, P: PixelSink> {
    storage: S,
    sink: P,
    source: ByteSource<S::File>,
    decoder: FrameDecoder,
    colors: Option<ColorTable>,
}

impl<S: Storage, P: PixelSink> AnimationManager<S, P> {
    pub fn new(storage: S, sink: P) -> Self {
        Self {
            storage,
            sink,
            source: ByteSource::new(),
            decoder: FrameDecoder::new(),
            colors: None,
        }
    }

    /// Resolve the named colors against the ready panel and blank it
    pub fn begin(&mut self) -> ColorTable {
        let colors = ColorTable::resolve(&self.sink);
        self.sink.fill_screen(colors.black);
        self.colors = Some(colors);
        colors
    }

    /// Colors resolved by [`AnimationManager::begin`]
    pub const fn colors(&self) -> Option<&ColorTable> {
        self.colors.as_ref()
    }

    /// Draw the first frame of the animation at `path`
    pub fn play_emotion(&mut self, path: &str) -> Result<FrameInfo, PlaybackError> {
        let Self {
            storage,
            sink,
            source,
            decoder,
            ..
        } = self;

        let mut file = source.open(storage, path).inspect_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[AnimationManager.play_emotion] {}: {}", path, _err);
        })?;
        let result = decoder.decode_first_frame(&mut *file, |line| {
            composite(line, sink);
        });
        drop(file);

        result
            .inspect_err(|_err| {
                #[cfg(feature = "esp32-log")]
                println!("[AnimationManager.play_emotion] {}: {}", path, _err);
            })
            .map_err(PlaybackError::from)
    }

    /// Check whether an animation file exists
    pub fn contains(&self, path: &str) -> bool {
        self.storage.exists(path)
    }

    /// All `.gif` files in the animations directory
    ///
    /// Stops silently once `N` entries are collected.
    pub fn list_available_emotions<const N: usize>(&self) -> Vec<AnimationInfo, N> {
        let mut found = Vec::new();
        self.storage.list(ANIMATIONS_DIR, &mut |path: &str, _size: u32| {
            if !path.ends_with(".gif") {
                return;
            }
            let Ok(id) = AnimationId::new(path) else {
                return;
            };
            let mut name = String::new();
            if name.push_str(display_name(path)).is_err() {
                return;
            }
            let _ = found.push(AnimationInfo { name, path: id });
        });
        found
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    /// Check if the single file slot is currently in use
    pub const fn is_file_open(&self) -> bool {
        self.source.is_open()
    }
}
