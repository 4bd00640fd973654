//! Scripted collaborators for controller tests

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::BartResult;
use crate::session::surface::{Alignment, InputSource, Key, PresentationSurface, TextPosition};
use crate::task::{RandomSource, StimulusRef};

/// Uniform draws from a script; `fallback` once the script runs out
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Scripted draws, then values that never pop an unclamped balloon
    pub fn new(draws: Vec<f64>) -> Self {
        ScriptedRandom {
            draws: draws.into(),
            fallback: 0.999_999,
        }
    }

    pub fn repeating(value: f64) -> Self {
        ScriptedRandom {
            draws: VecDeque::new(),
            fallback: value,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_uniform(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

/// Key responses from a script; `None` entries are timeouts.
/// Quits once the script runs out.
pub struct ScriptedInput {
    responses: VecDeque<Option<Key>>,
    pub waits: Vec<(Vec<Key>, Duration)>,
}

impl ScriptedInput {
    pub fn new(responses: Vec<Option<Key>>) -> Self {
        ScriptedInput {
            responses: responses.into(),
            waits: Vec::new(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn wait_for_key(&mut self, allowed: &[Key], max_wait: Duration) -> BartResult<Option<Key>> {
        self.waits.push((allowed.to_vec(), max_wait));
        let key = self.responses.pop_front().unwrap_or(Some(Key::Quit));
        assert!(
            key.map_or(true, |k| allowed.contains(&k)),
            "scripted {:?} not in {:?}",
            key,
            allowed
        );
        Ok(key)
    }
}

/// One queued draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Image { image: StimulusRef, scale: f32 },
    Text { position: TextPosition, text: String, alignment: Alignment },
}

/// Records every flipped frame and pause
#[derive(Default)]
pub struct RecordingSurface {
    pending: Vec<DrawCommand>,
    pub frames: Vec<Vec<DrawCommand>>,
    pub pauses: Vec<Duration>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text drawn in any flipped frame
    pub fn texts(&self) -> Vec<&str> {
        self.frames
            .iter()
            .flatten()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                DrawCommand::Image { .. } => None,
            })
            .collect()
    }

    pub fn shows_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl PresentationSurface for RecordingSurface {
    fn show_image(&mut self, image: &StimulusRef, scale: f32) -> BartResult<()> {
        self.pending.push(DrawCommand::Image {
            image: image.clone(),
            scale,
        });
        Ok(())
    }

    fn show_text(
        &mut self,
        position: TextPosition,
        text: &str,
        alignment: Alignment,
    ) -> BartResult<()> {
        self.pending.push(DrawCommand::Text {
            position,
            text: text.to_string(),
            alignment,
        });
        Ok(())
    }

    fn refresh_frame(&mut self) -> BartResult<()> {
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> BartResult<()> {
        self.pauses.push(duration);
        Ok(())
    }
}
