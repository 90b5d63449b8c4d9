//! View model state machine.
//!
//! The host drives a view model one way through its states:
//!
//! ```text
//! Uncreated --create--> Created --resume--> Resumed --pause--> Paused
//!                                              ^                  |
//!                                              +------resume------+
//! Created | Paused --destroy--> Destroyed
//! ```

use std::fmt;

/// Where a view model is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewModelState {
    Uncreated,
    Created,
    Resumed,
    Paused,
    Destroyed,
}

/// A call a host can make into a view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Create,
    Resume,
    Pause,
    Destroy,
    PushResult,
    PushIntent,
    AddSubscription,
}

impl ViewModelState {
    /// The state after `hook`, or `None` if the hook is not allowed now.
    pub fn after(self, hook: Hook) -> Option<ViewModelState> {
        use ViewModelState::*;

        match (self, hook) {
            (Destroyed, _) => None,
            (Uncreated, Hook::Create) => Some(Created),
            (Created | Paused, Hook::Resume) => Some(Resumed),
            (Resumed, Hook::Pause) => Some(Paused),
            (Created | Paused, Hook::Destroy) => Some(Destroyed),
            (Created | Resumed | Paused, Hook::PushResult | Hook::PushIntent) => Some(self),
            (_, Hook::AddSubscription) => Some(self),
            _ => None,
        }
    }

    pub fn is_destroyed(self) -> bool {
        self == ViewModelState::Destroyed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewModelState::Uncreated => "uncreated",
            ViewModelState::Created => "created",
            ViewModelState::Resumed => "resumed",
            ViewModelState::Paused => "paused",
            ViewModelState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ViewModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Hook {
    pub fn as_str(self) -> &'static str {
        match self {
            Hook::Create => "create",
            Hook::Resume => "resume",
            Hook::Pause => "pause",
            Hook::Destroy => "destroy",
            Hook::PushResult => "push_result",
            Hook::PushIntent => "push_intent",
            Hook::AddSubscription => "add_subscription",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
