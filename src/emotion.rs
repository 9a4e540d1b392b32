//! Emotion selection state
//!
//! The emotion shown on the face is simply the path of the animation file
//! being played. [`EmotionState`] is the single owner of that choice and keeps
//! exactly one step of history.

use core::fmt;

use heapless::String;

use crate::storage::{ANIMATIONS_DIR, display_name};

/// Maximum length of an animation path in bytes
pub const MAX_ANIMATION_PATH_LEN: usize = 64;

/// Returned when a path does not fit into an [`AnimationId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationIdError {
    TooLong,
}

impl fmt::Display for AnimationIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "animation path longer than {} bytes", MAX_ANIMATION_PATH_LEN),
        }
    }
}

/// Case-sensitive storage path of an animation, e.g. `/anims/happy.gif`
///
/// Existence is not checked; a missing file shows up when it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationId(String<MAX_ANIMATION_PATH_LEN>);

impl AnimationId {
    pub fn new(path: &str) -> Result<Self, AnimationIdError> {
        let mut inner = String::new();
        inner.push_str(path).map_err(|()| AnimationIdError::TooLong)?;
        Ok(Self(inner))
    }

    /// Build `dir` + `file`
    pub fn join(dir: &str, file: &str) -> Result<Self, AnimationIdError> {
        let mut id = Self::new(dir)?;
        id.0.push_str(file).map_err(|()| AnimationIdError::TooLong)?;
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without directory and extension
    pub fn display_name(&self) -> &str {
        display_name(&self.0)
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for AnimationId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for AnimationId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

/// Storage path for an uploaded animation file (`happy.gif` -> `/anims/happy.gif`)
pub fn animation_path(file: &str) -> Result<AnimationId, AnimationIdError> {
    AnimationId::join(ANIMATIONS_DIR, file)
}

/// Animations selected at startup
#[derive(Debug, Clone, Copy)]
pub struct EmotionDefaults {
    pub initial: &'static str,
    pub tilt_up: &'static str,
    pub tilt_side: &'static str,
}

impl Default for EmotionDefaults {
    fn default() -> Self {
        Self {
            initial: "/anims/neutral.gif",
            tilt_up: "/anims/happy.gif",
            tilt_side: "/anims/confused.gif",
        }
    }
}

/// Which animation is active, which one was active before, and which ones
/// the tilt sensor switches to
#[derive(Debug, Clone)]
pub struct EmotionState {
    current: AnimationId,
    previous: AnimationId,
    tilt_up: AnimationId,
    tilt_side: AnimationId,
}

impl EmotionState {
    /// Create the state from startup defaults
    ///
    /// `previous` starts equal to `current`.
    pub fn new(defaults: &EmotionDefaults) -> Result<Self, AnimationIdError> {
        let current = AnimationId::new(defaults.initial)?;
        Ok(Self {
            previous: current.clone(),
            current,
            tilt_up: AnimationId::new(defaults.tilt_up)?,
            tilt_side: AnimationId::new(defaults.tilt_side)?,
        })
    }

    pub fn current(&self) -> &AnimationId {
        &self.current
    }

    pub fn previous(&self) -> &AnimationId {
        &self.previous
    }

    /// Display name of the current emotion (`/anims/happy.gif` -> `happy`)
    pub fn display_emotion(&self) -> &str {
        self.current.display_name()
    }

    /// Switch to `emotion`, moving the old current value into `previous`
    pub fn set_current_emotion(&mut self, emotion: AnimationId) {
        self.previous = core::mem::replace(&mut self.current, emotion);
    }

    pub fn tilt_up_target(&self) -> &AnimationId {
        &self.tilt_up
    }

    pub fn tilt_side_target(&self) -> &AnimationId {
        &self.tilt_side
    }

    pub fn set_tilt_up_target(&mut self, emotion: AnimationId) {
        self.tilt_up = emotion;
    }

    pub fn set_tilt_side_target(&mut self, emotion: AnimationId) {
        self.tilt_side = emotion;
    }
}
