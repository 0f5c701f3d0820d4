//! Raw input signals and pointer-position caching
//!
//! The host input source delivers key, mouse-button, and wheel signals
//! carrying a raw code plus the modifier-key state. Translation into
//! canonical event names lives in [`translate`]; the [`crate::messenger`]
//! is the sole consumer of that translation.

pub mod translate;

use bitflags::bitflags;

bitflags! {
    /// Modifier-key state carried by every raw input signal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// Shift key held
        const SHIFT = 1 << 0;
        /// Control key held
        const CONTROL = 1 << 1;
        /// Alt key held
        const ALT = 1 << 2;
        /// Meta (command/super) key held
        const META = 1 << 3;
    }
}

/// Whether a key or button signal is a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// Key or button pressed
    Down,
    /// Key or button released
    Up,
}

impl SignalMode {
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

/// Raw keyboard signal.
#[derive(Debug, Clone, Copy)]
pub struct KeySignal {
    /// Raw key code as delivered by the host
    pub code: u32,
    /// Modifier state at the time of the keystroke
    pub modifiers: Modifiers,
}

/// Raw mouse-button signal.
#[derive(Debug, Clone, Copy)]
pub struct ButtonSignal {
    /// Raw button code as delivered by the host
    pub button: u32,
    /// Modifier state at the time of the click
    pub modifiers: Modifiers,
}

/// Raw mouse-wheel signal. Negative `detail` scrolls up.
#[derive(Debug, Clone, Copy)]
pub struct WheelSignal {
    /// Signed scroll amount
    pub detail: i32,
    /// Modifier state at the time of the scroll
    pub modifiers: Modifiers,
}

/// Caches the current pointer position and the delta of the last movement.
///
/// Fed by the host via [`MouseWatcher::pointer_moved`]; all accessors
/// return `None` until the relevant data has been observed (a position
/// needs one movement, a delta needs two).
#[derive(Debug, Default)]
pub struct MouseWatcher {
    position: Option<(f64, f64)>,
    delta: Option<(f64, f64)>,
}

impl MouseWatcher {
    /// Create a watcher with no cached position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer movement to window coordinates `(x, y)`.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some((px, py)) = self.position {
            self.delta = Some((px - x, py - y));
        }
        self.position = Some((x, y));
    }

    /// Current pointer X coordinate.
    pub fn x(&self) -> Option<f64> {
        self.position.map(|(x, _)| x)
    }

    /// Current pointer Y coordinate.
    pub fn y(&self) -> Option<f64> {
        self.position.map(|(_, y)| y)
    }

    /// Horizontal delta of the last movement (previous minus current).
    pub fn dx(&self) -> Option<f64> {
        self.delta.map(|(dx, _)| dx)
    }

    /// Vertical delta of the last movement (previous minus current).
    pub fn dy(&self) -> Option<f64> {
        self.delta.map(|(_, dy)| dy)
    }
}
