//! Collaborator interfaces for the session controller
//!
//! - `PresentationSurface`: draw stimuli and text, flip, pause
//! - `InputSource`: blocking key wait with a timeout
//!
//! The terminal implementations live in `cli`.

use std::time::Duration;

use crate::error::BartResult;
use crate::task::StimulusRef;

/// Responses the task understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Pump,
    CashOut,
    Quit,
}

impl Key {
    /// Name of the physical key shown to participants
    pub fn label(&self) -> &'static str {
        match self {
            Key::Pump => "SPACE",
            Key::CashOut => "ENTER",
            Key::Quit => "ESC",
        }
    }
}

/// Normalized screen position: x and y in [-1, 1], y pointing up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPosition {
    pub x: f32,
    pub y: f32,
}

impl TextPosition {
    pub const CENTER: TextPosition = TextPosition { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        TextPosition { x, y }
    }
}

/// Horizontal text alignment around the anchor position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Something the controller can draw on and flip
pub trait PresentationSurface {
    /// Queue a stimulus image; `scale` is the fraction of the card area
    fn show_image(&mut self, image: &StimulusRef, scale: f32) -> BartResult<()>;

    /// Queue a text block (may contain newlines)
    fn show_text(&mut self, position: TextPosition, text: &str, alignment: Alignment)
        -> BartResult<()>;

    /// Present everything queued since the last flip
    fn refresh_frame(&mut self) -> BartResult<()>;

    /// Keep the current frame up
    fn pause(&mut self, duration: Duration) -> BartResult<()>;
}

/// Source of participant responses
pub trait InputSource {
    /// Wait for one of `allowed`; `None` when `max_wait` elapses
    fn wait_for_key(&mut self, allowed: &[Key], max_wait: Duration) -> BartResult<Option<Key>>;
}

impl<S: PresentationSurface + ?Sized> PresentationSurface for &mut S {
    fn show_image(&mut self, image: &StimulusRef, scale: f32) -> BartResult<()> {
        (**self).show_image(image, scale)
    }

    fn show_text(
        &mut self,
        position: TextPosition,
        text: &str,
        alignment: Alignment,
    ) -> BartResult<()> {
        (**self).show_text(position, text, alignment)
    }

    fn refresh_frame(&mut self) -> BartResult<()> {
        (**self).refresh_frame()
    }

    fn pause(&mut self, duration: Duration) -> BartResult<()> {
        (**self).pause(duration)
    }
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn wait_for_key(&mut self, allowed: &[Key], max_wait: Duration) -> BartResult<Option<Key>> {
        (**self).wait_for_key(allowed, max_wait)
    }
}
