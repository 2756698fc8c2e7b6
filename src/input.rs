//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals. The soft-drop key is modal
//! (engage on press, release on key-up or timeout), so its release is
//! synthesized from the absence of repeats when no release event arrives.

use crate::game::Intent;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Input handler decoding key events into game intents
pub struct InputHandler {
    /// Last press time for held keys (for DAS and release synthesis)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    /// Key bindings
    bindings: KeyBindings,
    /// DAS duration
    das: Duration,
    /// ARR duration
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn pressed(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub start: Vec<KeyCode>,
    pub save: Vec<KeyCode>,
    pub load: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&settings.keys.rotate_ccw),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            pause: Self::parse_keys(&settings.keys.pause),
            start: Self::parse_keys(&settings.keys.start),
            save: Self::parse_keys(&settings.keys.save),
            load: Self::parse_keys(&settings.keys.load),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate intents
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Intent> {
        let mut intents = Vec::new();
        let now = Instant::now();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            intents.push(Intent::Quit);
            return intents;
        }

        let code = normalize_key(key.code);

        // Held keys track press state for DAS and release synthesis
        if self.bindings.move_left.contains(&code) {
            if self.left_state.is_none() {
                intents.push(Intent::MoveLeft);
                self.left_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.left_state {
                state.last_seen = now;
            }
            // Cancel opposite direction
            self.right_state = None;
        } else if self.bindings.move_right.contains(&code) {
            if self.right_state.is_none() {
                intents.push(Intent::MoveRight);
                self.right_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.right_state {
                state.last_seen = now;
            }
            // Cancel opposite direction
            self.left_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            // Re-sent on every repeat; the session ignores it while the
            // drop is already engaged or still cooling down.
            intents.push(Intent::SoftDropStart);
            match &mut self.down_state {
                Some(state) => state.last_seen = now,
                None => self.down_state = Some(KeyPressState::pressed(now)),
            }
        } else if self.bindings.rotate_cw.contains(&code) {
            intents.push(Intent::RotateCw);
        } else if self.bindings.rotate_ccw.contains(&code) {
            intents.push(Intent::RotateCcw);
        } else if self.bindings.pause.contains(&code) {
            intents.push(Intent::TogglePause);
        } else if self.bindings.start.contains(&code) {
            intents.push(Intent::Start);
        } else if self.bindings.save.contains(&code) {
            intents.push(Intent::Save);
        } else if self.bindings.load.contains(&code) {
            intents.push(Intent::Load);
        } else if self.bindings.quit.contains(&code) {
            intents.push(Intent::Quit);
        }

        intents
    }

    /// Handle a key release event (may not be delivered on Linux)
    pub fn key_up(&mut self, key: KeyEvent) -> Vec<Intent> {
        let code = normalize_key(key.code);
        let mut intents = Vec::new();

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) && self.down_state.take().is_some() {
            intents.push(Intent::SoftDropStop);
        }

        intents
    }

    /// Update held keys and return repeat/synthesized intents (call every
    /// frame)
    pub fn update(&mut self) -> Vec<Intent> {
        let mut intents = Vec::new();
        let now = Instant::now();

        // Check for timed-out keys (no recent key event = released)
        if let Some(state) = &self.left_state {
            if now.duration_since(state.last_seen) > KEY_TIMEOUT {
                self.left_state = None;
            }
        }
        if let Some(state) = &self.right_state {
            if now.duration_since(state.last_seen) > KEY_TIMEOUT {
                self.right_state = None;
            }
        }
        if let Some(state) = &self.down_state {
            if now.duration_since(state.last_seen) > KEY_TIMEOUT {
                self.down_state = None;
                intents.push(Intent::SoftDropStop);
            }
        }

        // Copy DAS/ARR values to avoid borrow issues
        let das = self.das;
        let arr = self.arr;

        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now, das, arr) {
                intents.push(Intent::MoveLeft);
            }
        }
        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now, das, arr) {
                intents.push(Intent::MoveRight);
            }
        }

        intents
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) -> Vec<Intent> {
        self.left_state = None;
        self.right_state = None;
        if self.down_state.take().is_some() {
            vec![Intent::SoftDropStop]
        } else {
            Vec::new()
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            // Subsequent ARR triggers
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_bindings_decode_to_intents() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Char('a'))), vec![Intent::MoveLeft]);
        input.key_up(press(KeyCode::Char('a')));
        assert_eq!(input.key_down(press(KeyCode::Char('d'))), vec![Intent::MoveRight]);
        assert_eq!(input.key_down(press(KeyCode::Char('e'))), vec![Intent::RotateCw]);
        assert_eq!(input.key_down(press(KeyCode::Char('q'))), vec![Intent::RotateCcw]);
        assert_eq!(input.key_down(press(KeyCode::Char('p'))), vec![Intent::TogglePause]);
        assert_eq!(input.key_down(press(KeyCode::Enter)), vec![Intent::Start]);
        assert_eq!(input.key_down(press(KeyCode::Char('g'))), vec![Intent::Save]);
        assert_eq!(input.key_down(press(KeyCode::Char('c'))), vec![Intent::Load]);
        assert_eq!(input.key_down(press(KeyCode::Esc)), vec![Intent::Quit]);
    }

    #[test]
    fn soft_drop_is_modal() {
        let mut input = InputHandler::new();
        assert_eq!(
            input.key_down(press(KeyCode::Char('s'))),
            vec![Intent::SoftDropStart]
        );
        // Repeats keep the key alive and re-assert the engage
        assert_eq!(
            input.key_down(press(KeyCode::Char('s'))),
            vec![Intent::SoftDropStart]
        );
        // A real release stops the drop exactly once
        assert_eq!(
            input.key_up(press(KeyCode::Char('s'))),
            vec![Intent::SoftDropStop]
        );
        assert_eq!(input.key_up(press(KeyCode::Char('s'))), Vec::new());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut input = InputHandler::new();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.key_down(event), vec![Intent::Quit]);
    }

    #[test]
    fn opposite_direction_cancels_held_movement() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Left));
        assert_eq!(input.key_down(press(KeyCode::Right)), vec![Intent::MoveRight]);
        // Left is no longer held, so pressing it again is a fresh press
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Intent::MoveLeft]);
    }

    #[test]
    fn clear_releases_an_engaged_soft_drop() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Char('s')));
        assert_eq!(input.clear(), vec![Intent::SoftDropStop]);
        assert_eq!(input.clear(), Vec::new());
    }
}
