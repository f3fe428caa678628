//! Conditional stack for nested `##~` / `##@` / `##.` blocks

use crate::common::ErrorKind;

/// One open conditional block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub active: bool,
    pub in_else: bool,
    /// Line of the `##~` directive that opened the block
    pub opened_at: usize,
}

/// Tracks nested conditional regions
///
/// A line is processed only if every frame is active.
#[derive(Debug, Default)]
pub struct ConditionalStack {
    frames: Vec<Frame>,
}

impl ConditionalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, active: bool, opened_at: usize) {
        self.frames.push(Frame {
            active,
            in_else: false,
            opened_at,
        });
    }

    pub fn pop(&mut self) -> Result<Frame, ErrorKind> {
        self.frames.pop().ok_or(ErrorKind::UnmatchedClose)
    }

    /// Flip the innermost frame into (or back out of) its else branch
    pub fn toggle_else(&mut self) -> Result<(), ErrorKind> {
        let frame = self.frames.last_mut().ok_or(ErrorKind::DanglingElse)?;
        frame.in_else = !frame.in_else;
        frame.active = !frame.active;
        Ok(())
    }

    /// Overwrite the innermost frame's condition (else-if)
    pub fn replace_top(&mut self, active: bool) -> Result<(), ErrorKind> {
        let frame = self.frames.last_mut().ok_or(ErrorKind::DanglingElse)?;
        frame.active = active;
        Ok(())
    }

    pub fn should_process(&self) -> bool {
        self.frames.iter().all(|frame| frame.active)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }
}
