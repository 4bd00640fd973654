//! Terminal display and UI rendering
//!
//! Features:
//! - Alternate screen + raw mode held for the display's lifetime
//! - Frame buffer: draw calls are queued and painted on `refresh_frame`
//! - Stimulus images drawn as framed cards labelled with the image name
//! - Normalized text positions mapped onto the terminal grid

use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Stdout, Write};
use std::thread;
use std::time::Duration;

use crate::error::BartResult;
use crate::session::{Alignment, PresentationSurface, TextPosition};
use crate::task::StimulusRef;

/// Largest card as a fraction of the terminal
const CARD_MAX_WIDTH: f32 = 0.5;
const CARD_MAX_HEIGHT: f32 = 0.6;

enum DrawOp {
    Card { label: String, scale: f32, alert: bool },
    Text { position: TextPosition, text: String, alignment: Alignment },
}

/// Terminal display manager
pub struct Display {
    stdout: Stdout,
    pending: Vec<DrawOp>,
    /// Image drawn in red (the losing card)
    alert_image: StimulusRef,
    /// Whether we're holding raw mode and the alternate screen
    active: bool,
}

impl Display {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor
    pub fn open(alert_image: StimulusRef) -> BartResult<Self> {
        terminal::enable_raw_mode()?;
        let mut display = Display {
            stdout: stdout(),
            pending: Vec::new(),
            alert_image,
            active: true,
        };
        execute!(display.stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(display)
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&mut self) -> BartResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.stdout, LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn draw_card(
        &mut self,
        label: &str,
        scale: f32,
        alert: bool,
        cols: u16,
        rows: u16,
    ) -> BartResult<()> {
        let (left, top, width, height) = card_rect(scale, cols, rows);
        let inner = usize::from(width.saturating_sub(2));

        queue!(
            self.stdout,
            SetForegroundColor(if alert { Color::Red } else { Color::Cyan })
        )?;
        for row in 0..height {
            let line = if row == 0 {
                format!("┌{}┐", "─".repeat(inner))
            } else if row == height - 1 {
                format!("└{}┘", "─".repeat(inner))
            } else {
                format!("│{}│", " ".repeat(inner))
            };
            queue!(self.stdout, cursor::MoveTo(left, top + row), Print(line))?;
        }

        let shown: String = label.chars().take(inner).collect();
        let label_col = left + 1 + ((inner - shown.chars().count()) / 2) as u16;
        queue!(
            self.stdout,
            cursor::MoveTo(label_col, top + height / 2),
            Print(shown),
            ResetColor
        )?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        position: TextPosition,
        text: &str,
        alignment: Alignment,
        cols: u16,
        rows: u16,
    ) -> BartResult<()> {
        let lines: Vec<&str> = text.lines().collect();
        let (anchor_col, anchor_row) = to_cell(position, cols, rows);

        // Centered blocks are centered vertically; others sit on their anchor
        let first_row = match alignment {
            Alignment::Center => {
                anchor_row.saturating_sub((lines.len() as u16).saturating_sub(1) / 2)
            }
            Alignment::Left | Alignment::Right => {
                anchor_row.saturating_sub((lines.len() as u16).saturating_sub(1))
            }
        };

        for (i, line) in lines.iter().enumerate() {
            let row = first_row + i as u16;
            if row >= rows {
                break;
            }
            let visible: String = line.chars().take(usize::from(cols)).collect();
            let col = line_start(anchor_col, visible.chars().count() as u16, alignment, cols);
            queue!(self.stdout, cursor::MoveTo(col, row), Print(visible))?;
        }
        Ok(())
    }
}

/// Map a normalized position onto (column, row)
fn to_cell(position: TextPosition, cols: u16, rows: u16) -> (u16, u16) {
    let max_col = f32::from(cols.saturating_sub(1));
    let max_row = f32::from(rows.saturating_sub(1));
    let x = position.x.clamp(-1.0, 1.0);
    let y = position.y.clamp(-1.0, 1.0);
    let col = ((x + 1.0) / 2.0 * max_col).round() as u16;
    let row = ((1.0 - y) / 2.0 * max_row).round() as u16;
    (col, row)
}

/// First column of a line of `len` cells aligned on `anchor`
fn line_start(anchor: u16, len: u16, alignment: Alignment, cols: u16) -> u16 {
    let start = match alignment {
        Alignment::Left => anchor,
        Alignment::Center => anchor.saturating_sub(len / 2),
        Alignment::Right => (anchor + 1).saturating_sub(len),
    };
    start.min(cols.saturating_sub(len))
}

/// Card rectangle (left, top, width, height), centered on screen
fn card_rect(scale: f32, cols: u16, rows: u16) -> (u16, u16, u16, u16) {
    let scale = scale.clamp(0.0, 1.0);
    let width = ((f32::from(cols) * CARD_MAX_WIDTH * scale).round() as u16)
        .max(7)
        .min(cols);
    let height = ((f32::from(rows) * CARD_MAX_HEIGHT * scale).round() as u16)
        .max(3)
        .min(rows);
    let left = (cols - width) / 2;
    let top = (rows - height) / 2;
    (left, top, width, height)
}

impl PresentationSurface for Display {
    fn show_image(&mut self, image: &StimulusRef, scale: f32) -> BartResult<()> {
        self.pending.push(DrawOp::Card {
            label: image.label().to_string(),
            scale,
            alert: *image == self.alert_image,
        });
        Ok(())
    }

    fn show_text(
        &mut self,
        position: TextPosition,
        text: &str,
        alignment: Alignment,
    ) -> BartResult<()> {
        self.pending.push(DrawOp::Text {
            position,
            text: text.to_string(),
            alignment,
        });
        Ok(())
    }

    fn refresh_frame(&mut self) -> BartResult<()> {
        let (cols, rows) = terminal::size()?;
        queue!(self.stdout, terminal::Clear(ClearType::All))?;

        for op in std::mem::take(&mut self.pending) {
            match op {
                DrawOp::Card { label, scale, alert } => {
                    self.draw_card(&label, scale, alert, cols, rows)?
                }
                DrawOp::Text {
                    position,
                    text,
                    alignment,
                } => self.draw_text(position, &text, alignment, cols, rows)?,
            }
        }

        self.stdout.flush()?;
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> BartResult<()> {
        thread::sleep(duration);
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}
