//! Input simulation seam. [`EnigoSimulator`] drives the real keyboard and mouse;
//! tests substitute a recording fake.

use enigo::{Button, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use thiserror::Error;

use crate::action::{MouseButton, Step};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open input session: {0}")]
    Session(String),
    #[error("failed to simulate {step}: {reason}")]
    Step { step: Step, reason: String },
}

/// Synthesizes a single input step on the host.
pub trait InputSimulator {
    fn perform(&mut self, step: Step) -> Result<(), InputError>;
}

/// Sends input through `enigo`. A fresh connection is opened for every step so
/// the simulator holds no platform handle between tips.
#[derive(Debug, Default)]
pub struct EnigoSimulator;

impl InputSimulator for EnigoSimulator {
    fn perform(&mut self, step: Step) -> Result<(), InputError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| InputError::Session(e.to_string()))?;

        let result = match step {
            Step::KeyTap(c) => enigo.key(Key::Unicode(c), Direction::Click),
            Step::MouseClick(button) => enigo.button(to_enigo_button(button), Direction::Click),
        };
        result.map_err(|e| InputError::Step {
            step,
            reason: e.to_string(),
        })?;

        tracing::trace!(%step, "input simulated");
        Ok(())
    }
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
    }
}
