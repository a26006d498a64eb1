use std::collections::HashSet;

use winit::keyboard::KeyCode as WinitKey;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Function(u8),
}

impl KeyCode {
    /// Maps a winit physical key onto the keys the demo reacts to.
    pub fn from_winit(code: WinitKey) -> Option<Self> {
        use NamedKey::*;
        let named = |key| Some(KeyCode::Named(key));
        match code {
            WinitKey::ArrowLeft => named(Left),
            WinitKey::ArrowRight => named(Right),
            WinitKey::ArrowUp => named(Up),
            WinitKey::ArrowDown => named(Down),
            WinitKey::Escape => named(Escape),
            WinitKey::KeyA => Some(KeyCode::Character('A')),
            WinitKey::KeyD => Some(KeyCode::Character('D')),
            WinitKey::KeyE => Some(KeyCode::Character('E')),
            WinitKey::KeyQ => Some(KeyCode::Character('Q')),
            WinitKey::KeyS => Some(KeyCode::Character('S')),
            WinitKey::KeyW => Some(KeyCode::Character('W')),
            WinitKey::F11 => Some(KeyCode::Function(11)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Left,
    Right,
    Up,
    Down,
    Escape,
}

/// Keys currently held, for continuous camera movement.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the key was not already held.
    pub fn set_key_down(&mut self, key: KeyCode) -> bool {
        self.keys.insert(key)
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_winit_keys() {
        assert_eq!(
            KeyCode::from_winit(WinitKey::KeyW),
            Some(KeyCode::Character('W'))
        );
        assert_eq!(
            KeyCode::from_winit(WinitKey::ArrowUp),
            Some(KeyCode::Named(NamedKey::Up))
        );
        assert_eq!(KeyCode::from_winit(WinitKey::F11), Some(KeyCode::Function(11)));
        assert_eq!(KeyCode::from_winit(WinitKey::Tab), None);
    }

    #[test]
    fn input_state_tracks_keys() {
        let mut state = InputState::new();
        let left = KeyCode::Named(NamedKey::Left);
        assert!(state.set_key_down(left));
        assert!(!state.set_key_down(left));
        assert!(state.is_key_down(left));
        state.set_key_up(left);
        assert!(!state.is_key_down(left));
    }

    #[test]
    fn clear_releases_everything() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        state.set_key_down(KeyCode::Named(NamedKey::Down));
        state.clear();
        assert!(!state.is_key_down(KeyCode::Character('W')));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Down)));
    }
}
