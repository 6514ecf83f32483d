use crate::dots::messages::{ExitReason, OverlayCommand};
use rdev::{listen, EventType, Key};
use std::fmt;
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

pub const DEFAULT_EXIT_HOTKEY: &str = "Ctrl+Shift+Q";

/// How long registration waits for the listener to report a startup failure.
pub const REGISTRATION_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self {
            key: Key::KeyQ,
            ctrl: true,
            shift: true,
            alt: false,
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        let name = format!("{:?}", self.key);
        write!(f, "{}", name.strip_prefix("Key").unwrap_or(&name))
    }
}

/// Parse a hotkey string like "Ctrl+Shift+Q" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => key = Some(parse_key(&upper)?),
        }
    }

    key.map(|k| Hotkey {
        key: k,
        ctrl,
        shift,
        alt,
    })
}

fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "END" => Some(Key::End),
        "PAUSE" => Some(Key::Pause),
        _ if upper.starts_with('F') && upper.len() > 1 => match upper[1..].parse::<u8>().ok()? {
            1 => Some(Key::F1),
            2 => Some(Key::F2),
            3 => Some(Key::F3),
            4 => Some(Key::F4),
            5 => Some(Key::F5),
            6 => Some(Key::F6),
            7 => Some(Key::F7),
            8 => Some(Key::F8),
            9 => Some(Key::F9),
            10 => Some(Key::F10),
            11 => Some(Key::F11),
            12 => Some(Key::F12),
            _ => None,
        },
        _ if upper.len() == 1 => match upper.chars().next()? {
            'A' => Some(Key::KeyA),
            'B' => Some(Key::KeyB),
            'C' => Some(Key::KeyC),
            'D' => Some(Key::KeyD),
            'E' => Some(Key::KeyE),
            'F' => Some(Key::KeyF),
            'G' => Some(Key::KeyG),
            'H' => Some(Key::KeyH),
            'I' => Some(Key::KeyI),
            'J' => Some(Key::KeyJ),
            'K' => Some(Key::KeyK),
            'L' => Some(Key::KeyL),
            'M' => Some(Key::KeyM),
            'N' => Some(Key::KeyN),
            'O' => Some(Key::KeyO),
            'P' => Some(Key::KeyP),
            'Q' => Some(Key::KeyQ),
            'R' => Some(Key::KeyR),
            'S' => Some(Key::KeyS),
            'T' => Some(Key::KeyT),
            'U' => Some(Key::KeyU),
            'V' => Some(Key::KeyV),
            'W' => Some(Key::KeyW),
            'X' => Some(Key::KeyX),
            'Y' => Some(Key::KeyY),
            'Z' => Some(Key::KeyZ),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    RegistrationFailed(String),
}

impl fmt::Display for HotkeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyError::RegistrationFailed(cause) => {
                write!(f, "global hotkey registration failed: {cause}")
            }
        }
    }
}

impl std::error::Error for HotkeyError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyTransition {
    Pressed(Key),
    Released(Key),
}

/// Tracks modifier and key state and reports when the chord is completed.
#[derive(Debug)]
pub struct ChordTracker {
    hotkey: Hotkey,
    ctrl_pressed: bool,
    shift_pressed: bool,
    alt_pressed: bool,
    watch_pressed: bool,
    triggered: bool,
}

impl ChordTracker {
    pub fn new(hotkey: Hotkey) -> Self {
        Self {
            hotkey,
            ctrl_pressed: false,
            shift_pressed: false,
            alt_pressed: false,
            watch_pressed: false,
            triggered: false,
        }
    }

    /// Feed one key transition. Returns `true` once per chord press.
    pub fn observe(&mut self, transition: KeyTransition) -> bool {
        let (key, down) = match transition {
            KeyTransition::Pressed(k) => (k, true),
            KeyTransition::Released(k) => (k, false),
        };
        match key {
            Key::ControlLeft | Key::ControlRight => self.ctrl_pressed = down,
            Key::ShiftLeft | Key::ShiftRight => self.shift_pressed = down,
            Key::Alt | Key::AltGr => self.alt_pressed = down,
            _ => {}
        }
        if key == self.hotkey.key {
            self.watch_pressed = down;
        }

        let combo = self.watch_pressed
            && (!self.hotkey.ctrl || self.ctrl_pressed)
            && (!self.hotkey.shift || self.shift_pressed)
            && (!self.hotkey.alt || self.alt_pressed);
        if combo {
            if !self.triggered {
                self.triggered = true;
                tracing::debug!(hotkey = %self.hotkey, "exit chord matched");
                return true;
            }
        } else {
            self.triggered = false;
        }
        false
    }
}

/// Source of global key transitions. `run` blocks for as long as the listener
/// is alive and returns an error when the OS refuses the hook.
pub trait KeyListener: Send + 'static {
    fn run(self, on_key: Box<dyn FnMut(KeyTransition) + Send>) -> Result<(), String>;
}

/// Listener backed by `rdev::listen`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdevListener;

impl KeyListener for RdevListener {
    fn run(self, mut on_key: Box<dyn FnMut(KeyTransition) + Send>) -> Result<(), String> {
        listen(move |event| match event.event_type {
            EventType::KeyPress(k) => on_key(KeyTransition::Pressed(k)),
            EventType::KeyRelease(k) => on_key(KeyTransition::Released(k)),
            _ => {}
        })
        .map_err(|e| format!("{e:?}"))
    }
}

/// A successfully registered exit chord.
#[derive(Debug)]
pub struct ExitHotkey {
    pub hotkey: Hotkey,
    _listener: thread::JoinHandle<()>,
}

/// Start `listener` on its own thread. Each completed chord posts
/// [`OverlayCommand::RequestExit`] into `commands`.
pub fn register_exit_hotkey<L: KeyListener>(
    listener: L,
    hotkey: Hotkey,
    commands: Sender<OverlayCommand>,
) -> Result<ExitHotkey, HotkeyError> {
    let (startup_tx, startup_rx) = channel::<Result<(), String>>();
    // Cleared once the grace period has passed; a later failure is reported by
    // the listener thread itself.
    let awaiting = Arc::new(Mutex::new(true));
    let listener_awaiting = Arc::clone(&awaiting);

    let handle = thread::Builder::new()
        .name("exit-hotkey".to_string())
        .spawn(move || {
            let mut tracker = ChordTracker::new(hotkey);
            let result = listener.run(Box::new(move |transition| {
                if tracker.observe(transition) {
                    let _ = commands.send(OverlayCommand::RequestExit {
                        reason: ExitReason::Hotkey,
                    });
                }
            }));
            let awaiting = listener_awaiting.lock().unwrap_or_else(PoisonError::into_inner);
            if *awaiting {
                let _ = startup_tx.send(result);
                return;
            }
            match result {
                Err(cause) => warn_unavailable(&hotkey, &HotkeyError::RegistrationFailed(cause)),
                Ok(()) => tracing::debug!(%hotkey, "hotkey listener stopped"),
            }
        })
        .map_err(|e| HotkeyError::RegistrationFailed(format!("failed to spawn listener thread: {e}")))?;

    let early = match startup_rx.recv_timeout(REGISTRATION_GRACE) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => {
            *awaiting.lock().unwrap_or_else(PoisonError::into_inner) = false;
            // the listener may have finished while the lock was contended
            startup_rx.try_recv().ok()
        }
        Err(RecvTimeoutError::Disconnected) => Some(Ok(())),
    };

    match early {
        None => {
            tracing::debug!(%hotkey, "exit hotkey registered");
            Ok(ExitHotkey {
                hotkey,
                _listener: handle,
            })
        }
        Some(Err(cause)) => Err(HotkeyError::RegistrationFailed(cause)),
        Some(Ok(())) => Err(HotkeyError::RegistrationFailed(
            "listener exited immediately".to_string(),
        )),
    }
}

/// The two operator-facing lines emitted when the exit chord is unavailable.
pub fn registration_warning(hotkey: &Hotkey, err: &HotkeyError) -> [String; 2] {
    [
        format!("Warning: exit hotkey {hotkey} could not be registered; elevated privileges may be required. ({err})"),
        "Stop the overlay through the task manager or by terminating the process instead.".to_string(),
    ]
}

/// Register the exit chord, downgrading failure to a logged warning.
pub fn install_exit_hotkey<L: KeyListener>(
    listener: L,
    hotkey: Hotkey,
    commands: Sender<OverlayCommand>,
) -> Option<ExitHotkey> {
    match register_exit_hotkey(listener, hotkey, commands) {
        Ok(registered) => Some(registered),
        Err(err) => {
            warn_unavailable(&hotkey, &err);
            None
        }
    }
}

fn warn_unavailable(hotkey: &Hotkey, err: &HotkeyError) {
    for line in registration_warning(hotkey, err) {
        tracing::warn!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chord_is_ctrl_shift_q() {
        let hk = parse_hotkey(DEFAULT_EXIT_HOTKEY).expect("default parses");
        assert_eq!(hk, Hotkey::default());
        assert_eq!(hk.to_string(), "Ctrl+Shift+Q");
    }

    #[test]
    fn parse_is_case_and_space_insensitive() {
        let hk = parse_hotkey(" ctrl + alt + f4 ").expect("should parse");
        assert_eq!(hk.key, Key::F4);
        assert!(hk.ctrl && hk.alt && !hk.shift);
    }

    #[test]
    fn parse_rejects_unknown_or_missing_key() {
        assert!(parse_hotkey("Ctrl+Foo").is_none());
        assert!(parse_hotkey("Ctrl+Shift").is_none());
        assert!(parse_hotkey("F13").is_none());
        assert!(parse_hotkey("").is_none());
    }

    #[test]
    fn chord_fires_once_until_released() {
        let mut tracker = ChordTracker::new(Hotkey::default());
        assert!(!tracker.observe(KeyTransition::Pressed(Key::ControlLeft)));
        assert!(!tracker.observe(KeyTransition::Pressed(Key::ShiftRight)));
        assert!(tracker.observe(KeyTransition::Pressed(Key::KeyQ)));
        // auto-repeat
        assert!(!tracker.observe(KeyTransition::Pressed(Key::KeyQ)));
        assert!(!tracker.observe(KeyTransition::Released(Key::KeyQ)));
        assert!(tracker.observe(KeyTransition::Pressed(Key::KeyQ)));
    }

    #[test]
    fn chord_requires_all_modifiers() {
        let mut tracker = ChordTracker::new(Hotkey::default());
        assert!(!tracker.observe(KeyTransition::Pressed(Key::ControlLeft)));
        assert!(!tracker.observe(KeyTransition::Pressed(Key::KeyQ)));
        assert!(!tracker.observe(KeyTransition::Released(Key::KeyQ)));
        assert!(!tracker.observe(KeyTransition::Released(Key::ControlLeft)));
        assert!(!tracker.observe(KeyTransition::Pressed(Key::ShiftLeft)));
        assert!(!tracker.observe(KeyTransition::Pressed(Key::KeyQ)));
    }

    #[test]
    fn warning_mentions_chord_and_cause() {
        let err = HotkeyError::RegistrationFailed("EventTapError".into());
        let [first, second] = registration_warning(&Hotkey::default(), &err);
        assert!(first.contains("Ctrl+Shift+Q"));
        assert!(first.contains("EventTapError"));
        assert!(second.contains("terminating the process"));
    }
}
