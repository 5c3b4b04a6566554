//! Key identifiers and the logical actions they trigger
//!
//! Key codes are opaque to the core; the defaults follow the common virtual-key
//! numbering (arrows 37-40, letters as uppercase ASCII) so a desktop front end
//! can pass its codes straight through.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Opaque key identifier supplied by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const ENTER: KeyCode = KeyCode(10);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const LEFT: KeyCode = KeyCode(37);
    pub const UP: KeyCode = KeyCode(38);
    pub const RIGHT: KeyCode = KeyCode(39);
    pub const DOWN: KeyCode = KeyCode(40);

    /// Key for an ASCII letter or digit (letters map to their uppercase code)
    pub fn from_char(c: char) -> KeyCode {
        KeyCode(c.to_ascii_uppercase() as u32)
    }

    /// Character typed by this key in name entry, if it is a letter, digit or space
    pub fn as_char(self) -> Option<char> {
        let c = char::from_u32(self.0)?;
        (c.is_ascii_alphanumeric() || c == ' ').then_some(c)
    }
}

/// Logical input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    Confirm,
    Cancel,
    Pause,
    PlaceBomb,
    Erase,
}

/// Key to action bindings
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut bindings = HashMap::new();

        // Movement
        bindings.insert(KeyCode::UP, Action::Move(Direction::Up));
        bindings.insert(KeyCode::from_char('w'), Action::Move(Direction::Up));
        bindings.insert(KeyCode::DOWN, Action::Move(Direction::Down));
        bindings.insert(KeyCode::from_char('s'), Action::Move(Direction::Down));
        bindings.insert(KeyCode::LEFT, Action::Move(Direction::Left));
        bindings.insert(KeyCode::from_char('a'), Action::Move(Direction::Left));
        bindings.insert(KeyCode::RIGHT, Action::Move(Direction::Right));
        bindings.insert(KeyCode::from_char('d'), Action::Move(Direction::Right));

        // Actions
        bindings.insert(KeyCode::ENTER, Action::Confirm);
        bindings.insert(KeyCode::ESCAPE, Action::Cancel);
        bindings.insert(KeyCode::from_char('p'), Action::Pause);
        bindings.insert(KeyCode::SPACE, Action::PlaceBomb);
        bindings.insert(KeyCode::BACKSPACE, Action::Erase);

        Self { bindings }
    }
}

impl KeyMap {
    pub fn action(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Rebind a key, returning the action it previously triggered
    pub fn bind(&mut self, key: KeyCode, action: Action) -> Option<Action> {
        self.bindings.insert(key, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyMap::default();
        assert_eq!(keys.action(KeyCode::UP), Some(Action::Move(Direction::Up)));
        assert_eq!(keys.action(KeyCode::from_char('D')), Some(Action::Move(Direction::Right)));
        assert_eq!(keys.action(KeyCode::SPACE), Some(Action::PlaceBomb));
        assert_eq!(keys.action(KeyCode::ESCAPE), Some(Action::Cancel));
        assert_eq!(keys.action(KeyCode::from_char('q')), None);
    }

    #[test]
    fn test_typed_characters() {
        assert_eq!(KeyCode::from_char('k').as_char(), Some('K'));
        assert_eq!(KeyCode(b'7' as u32).as_char(), Some('7'));
        assert_eq!(KeyCode::SPACE.as_char(), Some(' '));
        assert_eq!(KeyCode::ENTER.as_char(), None);
        assert_eq!(KeyCode::UP.as_char(), None);
    }

    #[test]
    fn test_rebind() {
        let mut keys = KeyMap::default();
        assert_eq!(keys.bind(KeyCode::from_char('b'), Action::PlaceBomb), None);
        assert_eq!(keys.action(KeyCode::from_char('b')), Some(Action::PlaceBomb));
    }
}
