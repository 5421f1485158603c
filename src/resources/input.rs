//! Key bindings.
//!
//! Raw [`Scancode`]s reported by the display driver are translated into
//! [`GameAction`]s through the [`InputMap`] resource. A scancode maps to at
//! most one action; an action may have several scancodes.
//!
//! Bindings persist through a [`KeyBindingStore`], keyed by action name with a
//! comma separated list of scancode names as value:
//!
//! ```ini
//! [input]
//! step = Space
//! nav_up = Up,W
//! ```

use bevy_ecs::prelude::Resource;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

macro_rules! scancodes {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Physical keys the game can bind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Scancode {
            $($variant),+
        }

        impl Scancode {
            pub const ALL: &'static [Scancode] = &[$(Scancode::$variant),+];

            /// Human readable key name, as stored in the config file.
            pub fn name(self) -> &'static str {
                match self {
                    $(Scancode::$variant => $name),+
                }
            }
        }
    };
}

scancodes! {
    A => "A", B => "B", C => "C", D => "D", E => "E", F => "F", G => "G",
    H => "H", I => "I", J => "J", K => "K", L => "L", M => "M", N => "N",
    O => "O", P => "P", Q => "Q", R => "R", S => "S", T => "T", U => "U",
    V => "V", W => "W", X => "X", Y => "Y", Z => "Z",
    Num0 => "0", Num1 => "1", Num2 => "2", Num3 => "3", Num4 => "4",
    Num5 => "5", Num6 => "6", Num7 => "7", Num8 => "8", Num9 => "9",
    Up => "Up", Down => "Down", Left => "Left", Right => "Right",
    Return => "Return", KpEnter => "Keypad Enter", Escape => "Escape",
    Backspace => "Backspace", Tab => "Tab", Space => "Space",
    F1 => "F1", F2 => "F2", F3 => "F3", F4 => "F4", F5 => "F5", F6 => "F6",
    F7 => "F7", F8 => "F8", F9 => "F9", F10 => "F10", F11 => "F11", F12 => "F12",
}

impl Scancode {
    /// Parse a key name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Scancode> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sc| sc.name().eq_ignore_ascii_case(name))
    }
}

/// Abstract inputs the game states react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameAction {
    NavUp,
    NavDown,
    NavLeft,
    NavRight,
    Confirm,
    Cancel,
    Step,
    CycleDigimon,
    PauseToggle,
    SelectDigi1,
    SelectDigi2,
    SelectDigi3,
    SelectDigi4,
    SelectDigi5,
    SelectDigi6,
    SelectDigi7,
    SelectDigi8,
    QuitGame,
}

impl GameAction {
    pub const ALL: [GameAction; 18] = [
        GameAction::NavUp,
        GameAction::NavDown,
        GameAction::NavLeft,
        GameAction::NavRight,
        GameAction::Confirm,
        GameAction::Cancel,
        GameAction::Step,
        GameAction::CycleDigimon,
        GameAction::PauseToggle,
        GameAction::SelectDigi1,
        GameAction::SelectDigi2,
        GameAction::SelectDigi3,
        GameAction::SelectDigi4,
        GameAction::SelectDigi5,
        GameAction::SelectDigi6,
        GameAction::SelectDigi7,
        GameAction::SelectDigi8,
        GameAction::QuitGame,
    ];

    /// Config key of the action.
    pub fn name(self) -> &'static str {
        match self {
            GameAction::NavUp => "nav_up",
            GameAction::NavDown => "nav_down",
            GameAction::NavLeft => "nav_left",
            GameAction::NavRight => "nav_right",
            GameAction::Confirm => "confirm",
            GameAction::Cancel => "cancel",
            GameAction::Step => "step",
            GameAction::CycleDigimon => "cycle_digimon",
            GameAction::PauseToggle => "pause_toggle",
            GameAction::SelectDigi1 => "select_digi_1",
            GameAction::SelectDigi2 => "select_digi_2",
            GameAction::SelectDigi3 => "select_digi_3",
            GameAction::SelectDigi4 => "select_digi_4",
            GameAction::SelectDigi5 => "select_digi_5",
            GameAction::SelectDigi6 => "select_digi_6",
            GameAction::SelectDigi7 => "select_digi_7",
            GameAction::SelectDigi8 => "select_digi_8",
            GameAction::QuitGame => "quit_game",
        }
    }

    pub fn from_name(name: &str) -> Option<GameAction> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Partner slot (0-based) selected by a `SelectDigi*` action.
    pub fn partner_slot(self) -> Option<usize> {
        match self {
            GameAction::SelectDigi1 => Some(0),
            GameAction::SelectDigi2 => Some(1),
            GameAction::SelectDigi3 => Some(2),
            GameAction::SelectDigi4 => Some(3),
            GameAction::SelectDigi5 => Some(4),
            GameAction::SelectDigi6 => Some(5),
            GameAction::SelectDigi7 => Some(6),
            GameAction::SelectDigi8 => Some(7),
            _ => None,
        }
    }
}

/// Value written for an action that currently has no key.
const UNBOUND: &str = "none";

/// Persistence collaborator for key bindings.
pub trait KeyBindingStore {
    /// Raw value stored for `action`, if any.
    fn binding_entry(&self, action: &str) -> Option<String>;
    /// Replace the stored bindings with `entries` and write them out.
    fn persist_bindings(&mut self, entries: &[(&'static str, String)]) -> Result<(), String>;
}

/// Bidirectional scancode/action map.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct InputMap {
    key_to_action: FxHashMap<Scancode, GameAction>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl InputMap {
    pub fn empty() -> Self {
        Self {
            key_to_action: FxHashMap::default(),
        }
    }

    /// Default layout: arrows/WASD navigate, Return/Z confirm, Escape/X
    /// cancel, Space steps, Tab cycles partners, 1-8 pick a partner.
    pub fn with_defaults() -> Self {
        use GameAction::*;
        use Scancode as K;
        let defaults = [
            (K::Up, NavUp),
            (K::W, NavUp),
            (K::Down, NavDown),
            (K::S, NavDown),
            (K::Left, NavLeft),
            (K::A, NavLeft),
            (K::Right, NavRight),
            (K::D, NavRight),
            (K::Return, Confirm),
            (K::KpEnter, Confirm),
            (K::Z, Confirm),
            (K::Escape, Cancel),
            (K::Backspace, Cancel),
            (K::X, Cancel),
            (K::Space, Step),
            (K::Tab, CycleDigimon),
            (K::C, CycleDigimon),
            (K::P, PauseToggle),
            (K::Num1, SelectDigi1),
            (K::Num2, SelectDigi2),
            (K::Num3, SelectDigi3),
            (K::Num4, SelectDigi4),
            (K::Num5, SelectDigi5),
            (K::Num6, SelectDigi6),
            (K::Num7, SelectDigi7),
            (K::Num8, SelectDigi8),
            (K::Q, QuitGame),
        ];
        let mut map = Self::empty();
        for (key, action) in defaults {
            map.key_to_action.insert(key, action);
        }
        map
    }

    /// Defaults overridden by whatever `store` holds.
    pub fn from_store(store: &dyn KeyBindingStore) -> Self {
        let mut map = Self::with_defaults();
        map.load_from(store);
        map
    }

    pub fn action_for(&self, key: Scancode) -> Option<GameAction> {
        self.key_to_action.get(&key).copied()
    }

    /// Keys bound to `action`, in stable order.
    pub fn keys_for(&self, action: GameAction) -> SmallVec<[Scancode; 4]> {
        let mut keys: SmallVec<[Scancode; 4]> = self
            .key_to_action
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.key_to_action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_action.is_empty()
    }

    /// Bind `key` to `action`, returning the action it was bound to before.
    pub fn bind(&mut self, key: Scancode, action: GameAction) -> Option<GameAction> {
        self.key_to_action.insert(key, action)
    }

    fn unbind_action(&mut self, action: GameAction) {
        self.key_to_action.retain(|_, a| *a != action);
    }

    /// Make `key` the only binding of `action` and persist the result.
    ///
    /// A key taken from another action is reassigned with a warning. Returns
    /// `true` only if persisting succeeded.
    pub fn rebind(
        &mut self,
        action: GameAction,
        key: Scancode,
        store: &mut dyn KeyBindingStore,
    ) -> bool {
        self.unbind_action(action);
        if let Some(previous) = self.key_to_action.get(&key).copied() {
            warn!(
                "Key '{}' was bound to '{}', rebinding to '{}'",
                key.name(),
                previous.name(),
                action.name()
            );
        }
        self.bind(key, action);
        info!("Bound '{}' to key '{}'", action.name(), key.name());

        match store.persist_bindings(&self.entries()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist key bindings: {}", e);
                false
            }
        }
    }

    /// [`InputMap::rebind`] addressed by names; unknown names fail without
    /// touching the map.
    pub fn rebind_by_name(
        &mut self,
        action: &str,
        key: &str,
        store: &mut dyn KeyBindingStore,
    ) -> bool {
        let Some(action) = GameAction::from_name(action) else {
            warn!("Cannot rebind unknown action '{}'", action);
            return false;
        };
        let Some(key) = Scancode::from_name(key) else {
            warn!("Cannot rebind '{}' to unknown key '{}'", action.name(), key);
            return false;
        };
        self.rebind(action, key, store)
    }

    /// Persisted form: one entry per action.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        GameAction::ALL
            .iter()
            .map(|action| {
                let keys = self.keys_for(*action);
                let value = if keys.is_empty() {
                    UNBOUND.to_string()
                } else {
                    keys.iter().map(|k| k.name()).collect::<Vec<_>>().join(",")
                };
                (action.name(), value)
            })
            .collect()
    }

    /// Apply stored entries on top of the current map.
    ///
    /// Actions without an entry, or whose entry names an unknown key, keep
    /// their current bindings.
    pub fn load_from(&mut self, store: &dyn KeyBindingStore) {
        for action in GameAction::ALL {
            let Some(raw) = store.binding_entry(action.name()) else {
                continue;
            };
            let Some(keys) = parse_keys(&raw) else {
                debug!(
                    "Ignoring malformed binding '{}' for '{}'",
                    raw,
                    action.name()
                );
                continue;
            };
            self.unbind_action(action);
            for key in keys {
                self.bind(key, action);
            }
        }
    }
}

fn parse_keys(raw: &str) -> Option<SmallVec<[Scancode; 4]>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(UNBOUND) {
        return Some(SmallVec::new());
    }
    if raw.is_empty() {
        return None;
    }
    raw.split(',').map(Scancode::from_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        entries: FxHashMap<String, String>,
        fail: bool,
        saves: usize,
    }

    impl KeyBindingStore for MemoryStore {
        fn binding_entry(&self, action: &str) -> Option<String> {
            self.entries.get(action).cloned()
        }

        fn persist_bindings(&mut self, entries: &[(&'static str, String)]) -> Result<(), String> {
            if self.fail {
                return Err("disk full".to_string());
            }
            self.entries = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            self.saves += 1;
            Ok(())
        }
    }

    #[test]
    fn test_default_space_steps() {
        let map = InputMap::with_defaults();
        assert_eq!(map.action_for(Scancode::Space), Some(GameAction::Step));
        assert_eq!(map.action_for(Scancode::W), Some(GameAction::NavUp));
        assert_eq!(map.action_for(Scancode::F5), None);
    }

    #[test]
    fn test_rebind_replaces_previous_keys() {
        let mut map = InputMap::with_defaults();
        let mut store = MemoryStore::default();
        assert!(map.rebind(GameAction::NavUp, Scancode::I, &mut store));
        assert_eq!(map.keys_for(GameAction::NavUp).as_slice(), &[Scancode::I]);
        assert_eq!(map.action_for(Scancode::W), None);
        assert_eq!(store.saves, 1);
    }

    #[test]
    fn test_rebind_conflict_overrides() {
        let mut map = InputMap::with_defaults();
        let mut store = MemoryStore::default();
        assert!(map.rebind(GameAction::Step, Scancode::Return, &mut store));
        assert_eq!(map.action_for(Scancode::Return), Some(GameAction::Step));
        assert_eq!(
            map.keys_for(GameAction::Confirm).as_slice(),
            &[Scancode::Z, Scancode::KpEnter]
        );
    }

    #[test]
    fn test_rebind_reports_persist_failure() {
        let mut map = InputMap::with_defaults();
        let mut store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        assert!(!map.rebind(GameAction::Step, Scancode::B, &mut store));
        // the in-memory binding still changed
        assert_eq!(map.action_for(Scancode::B), Some(GameAction::Step));
    }

    #[test]
    fn test_rebind_by_unknown_name_does_not_mutate() {
        let mut map = InputMap::with_defaults();
        let before = map.clone();
        let mut store = MemoryStore::default();
        assert!(!map.rebind_by_name("fly", "Space", &mut store));
        assert!(!map.rebind_by_name("step", "NoSuchKey", &mut store));
        assert_eq!(map, before);
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn test_load_falls_back_on_malformed() {
        let mut store = MemoryStore::default();
        store.entries.insert("step".into(), "Banana".into());
        store.entries.insert("confirm".into(), "".into());
        store.entries.insert("cancel".into(), "q , escape".into());
        let map = InputMap::from_store(&store);
        assert_eq!(map.action_for(Scancode::Space), Some(GameAction::Step));
        assert_eq!(map.action_for(Scancode::Return), Some(GameAction::Confirm));
        assert_eq!(map.action_for(Scancode::Q), Some(GameAction::Cancel));
        assert_eq!(map.action_for(Scancode::X), None);
    }

    #[test]
    fn test_entries_round_trip() {
        let mut map = InputMap::with_defaults();
        let mut store = MemoryStore::default();
        assert!(map.rebind(GameAction::Step, Scancode::Return, &mut store));
        assert!(map.rebind(GameAction::QuitGame, Scancode::Escape, &mut store));
        let loaded = InputMap::from_store(&store);
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_names_parse_case_insensitively() {
        assert_eq!(Scancode::from_name("keypad enter"), Some(Scancode::KpEnter));
        assert_eq!(GameAction::from_name("SELECT_DIGI_3"), Some(GameAction::SelectDigi3));
        assert_eq!(GameAction::SelectDigi3.partner_slot(), Some(2));
    }
}
