//! Speech debouncing
//!
//! Two independent policies decide whether an instruction is spoken. The edge
//! device re-announces an unchanged instruction every Nth reading so the
//! walker knows tracking is alive. The processing node announces changes only,
//! except that a lost path is repeated on every frame.
//!
//! Both are plain state values with a pure `next` transition; `observe` is the
//! in-place convenience used by the running loops.

use crate::types::{Command, NavigationCommand};

/// Edge-side repeat-count policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeatDebounce {
    pub last_command: Option<Command>,
    /// Identical readings since the last announcement
    pub repeat_count: u32,
}

impl RepeatDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the following state and whether `cmd` must be spoken.
    pub fn next(&self, cmd: &NavigationCommand, repeat_threshold: u32) -> (Self, bool) {
        if self.last_command != Some(cmd.command) {
            let state = Self {
                last_command: Some(cmd.command),
                repeat_count: 0,
            };
            return (state, true);
        }

        let repeat_count = self.repeat_count + 1;
        if repeat_count >= repeat_threshold || cmd.is_warning() {
            let state = Self {
                last_command: Some(cmd.command),
                repeat_count: 0,
            };
            return (state, true);
        }

        let state = Self {
            last_command: Some(cmd.command),
            repeat_count,
        };
        (state, false)
    }

    pub fn observe(&mut self, cmd: &NavigationCommand, repeat_threshold: u32) -> bool {
        let (state, speak) = self.next(cmd, repeat_threshold);
        *self = state;
        speak
    }
}

/// Processing-side change-only policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeDebounce {
    pub last_spoken_command: Option<Command>,
}

impl ChangeDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, cmd: &NavigationCommand) -> (Self, bool) {
        let speak = self.last_spoken_command != Some(cmd.command) || cmd.command == Command::Stop;
        if speak {
            let state = Self {
                last_spoken_command: Some(cmd.command),
            };
            (state, true)
        } else {
            (*self, false)
        }
    }

    pub fn observe(&mut self, cmd: &NavigationCommand) -> bool {
        let (state, speak) = self.next(cmd);
        *self = state;
        speak
    }
}
