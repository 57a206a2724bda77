use std::fmt::Display;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Status shared by every session attached to one [`Control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// Nothing started yet. Readers treat it like `Running`.
    #[default]
    Idle,
    Running,
    /// Readers suspend their decoder and block until the state changes.
    Paused,
    /// Terminal. Readers kill their decoder and return.
    Aborted,
}

impl Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlState::Idle => write!(f, "idle"),
            ControlState::Running => write!(f, "running"),
            ControlState::Paused => write!(f, "paused"),
            ControlState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Pause/abort switch shared between the owner of the program status and
/// the reader threads.
///
/// Share it with `Arc`. Several sessions may observe the same control; an
/// abort raised by any of them (or by the owner) stops all of them.
#[derive(Debug, Default)]
pub struct Control {
    state: Mutex<ControlState>,
    changed: Condvar,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn state(&self) -> ControlState {
        *self.state.lock()
    }

    pub fn is_aborted(&self) -> bool {
        self.state() == ControlState::Aborted
    }

    /// `Idle -> Running`.
    pub fn start(&self) -> bool {
        self.transition(|state| match state {
            ControlState::Idle => Some(ControlState::Running),
            _ => None,
        })
    }

    /// `Idle | Running -> Paused`.
    pub fn pause(&self) -> bool {
        self.transition(|state| match state {
            ControlState::Idle | ControlState::Running => Some(ControlState::Paused),
            _ => None,
        })
    }

    /// `Paused -> Running`.
    pub fn resume(&self) -> bool {
        self.transition(|state| match state {
            ControlState::Paused => Some(ControlState::Running),
            _ => None,
        })
    }

    /// Moves any state to `Aborted`. Returns `false` if it already was.
    pub fn abort(&self) -> bool {
        self.transition(|state| match state {
            ControlState::Aborted => None,
            _ => Some(ControlState::Aborted),
        })
    }

    /// Blocks while the state is `Paused` and returns the state that ended
    /// the pause.
    pub fn wait_while_paused(&self) -> ControlState {
        let mut state = self.state.lock();
        while *state == ControlState::Paused {
            self.changed.wait(&mut state);
        }
        *state
    }

    fn transition(&self, next: impl FnOnce(ControlState) -> Option<ControlState>) -> bool {
        let mut state = self.state.lock();
        match next(*state) {
            Some(new_state) => {
                log::debug!("control state {} -> {}", *state, new_state);
                *state = new_state;
                self.changed.notify_all();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn aborted_is_terminal() {
        let control = Control::new();
        assert!(control.start());
        assert!(control.abort());
        assert!(!control.abort());
        assert!(!control.pause());
        assert!(!control.resume());
        assert!(!control.start());
        assert_eq!(control.state(), ControlState::Aborted);
    }

    #[test]
    fn resume_only_from_paused() {
        let control = Control::new();
        assert!(!control.resume());
        assert!(control.pause());
        assert!(!control.pause());
        assert!(control.resume());
        assert_eq!(control.state(), ControlState::Running);
    }

    #[test]
    fn paused_waiter_wakes_on_change() {
        let control = Control::shared();
        control.pause();

        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.wait_while_paused())
        };
        thread::sleep(Duration::from_millis(20));
        control.abort();

        assert_eq!(waiter.join().unwrap(), ControlState::Aborted);
    }

    #[test]
    fn not_paused_returns_immediately() {
        let control = Control::new();
        assert_eq!(control.wait_while_paused(), ControlState::Idle);
    }
}
