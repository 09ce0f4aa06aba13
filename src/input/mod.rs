//! # Input Module
//!
//! Keyboard polling and the mapping from raw key presses to [`Intent`]s.
//!
//! Polling is the only part that talks to macroquad. The mapping itself is a
//! pure function of the current [`InputMode`] so it can be tested without a
//! window.

pub mod commands;

pub use commands::*;

use crate::Direction;
use macroquad::prelude::*;

/// One raw input event from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    /// A key went down this frame
    Key(KeyCode),
    /// A character was typed this frame
    Char(char),
}

/// Keys polled every frame.
const WATCHED_KEYS: [KeyCode; 16] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::H,
    KeyCode::J,
    KeyCode::K,
    KeyCode::L,
    KeyCode::A,
    KeyCode::D,
    KeyCode::F,
    KeyCode::S,
    KeyCode::Space,
    KeyCode::Enter,
    KeyCode::Backspace,
    KeyCode::Escape,
];

/// Input handler for processing player commands.
///
/// Collects the key presses and typed characters of a frame and turns them
/// into intents for whatever mode the session is in.
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.vi_keys_enabled);
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Drains this frame's key presses, then its typed characters.
    pub fn poll(&self) -> Vec<RawInput> {
        let mut inputs: Vec<RawInput> = WATCHED_KEYS
            .iter()
            .copied()
            .filter(|&key| is_key_pressed(key))
            .map(RawInput::Key)
            .collect();

        while let Some(c) = get_char_pressed() {
            inputs.push(RawInput::Char(c));
        }
        inputs
    }

    /// Maps one raw input to an intent for `mode`, if it means anything there.
    pub fn map_input(&self, mode: InputMode, input: RawInput) -> Option<Intent> {
        match input {
            RawInput::Key(key) => self.map_key(mode, key),
            RawInput::Char(c) if mode == InputMode::SeedEntry => {
                if c.is_ascii_digit() || c == '-' {
                    Some(Intent::AppendSeedChar(c))
                } else {
                    None
                }
            }
            RawInput::Char(_) => None,
        }
    }

    fn map_key(&self, mode: InputMode, key: KeyCode) -> Option<Intent> {
        match mode {
            InputMode::SeedEntry => match key {
                KeyCode::Enter => Some(Intent::CommitSeed),
                KeyCode::Backspace => Some(Intent::Backspace),
                KeyCode::Escape => Some(Intent::CancelSeedEdit),
                _ => None,
            },
            _ if key == KeyCode::Escape => Some(Intent::Quit),
            InputMode::Title | InputMode::Ended => {
                (key == KeyCode::Space).then_some(Intent::StartNewGame)
            }
            InputMode::Exploring => match key {
                KeyCode::S => Some(Intent::EnterSeedEdit),
                _ => self.movement(key).map(Intent::Move),
            },
            InputMode::CombatTurn => match key {
                KeyCode::A => Some(Intent::Attack),
                KeyCode::D => Some(Intent::Defend),
                KeyCode::F => Some(Intent::Flee),
                _ => None,
            },
            InputMode::CombatBusy => None,
            InputMode::CombatAwaitingAck => Some(Intent::Acknowledge),
        }
    }

    fn movement(&self, key: KeyCode) -> Option<Direction> {
        match key {
            KeyCode::Up => Some(Direction::North),
            KeyCode::Down => Some(Direction::South),
            KeyCode::Left => Some(Direction::West),
            KeyCode::Right => Some(Direction::East),
            KeyCode::K if self.vi_keys_enabled => Some(Direction::North),
            KeyCode::J if self.vi_keys_enabled => Some(Direction::South),
            KeyCode::H if self.vi_keys_enabled => Some(Direction::West),
            KeyCode::L if self.vi_keys_enabled => Some(Direction::East),
            _ => None,
        }
    }
}
