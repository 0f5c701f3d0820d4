//! Translation of raw input signals into canonical event names
//!
//! Event names are hyphen-joined lowercase components: active modifiers in
//! the fixed order `shift`, `control`, `alt`, `meta`, then the signal body,
//! then a `down`/`up` mode suffix. Wheel names carry no mode suffix.

use std::cmp::Ordering;

use super::{ButtonSignal, KeySignal, Modifiers, SignalMode, WheelSignal};

// Raw codes for the modifier keys themselves; a keystroke on one of these
// contributes its modifier name but no action body.
const CODE_META: u32 = 0;
const CODE_SHIFT: u32 = 16;
const CODE_CONTROL: u32 = 17;
const CODE_ALT: u32 = 18;
const CODE_META_RIGHT: u32 = 224;

/// Canonical name for a keyboard signal, e.g. `"shift-a-down"`.
pub fn key_event_name(signal: &KeySignal, mode: SignalMode) -> String {
    let code = signal.code;
    let mut components: Vec<String> = Vec::new();

    if signal.modifiers.contains(Modifiers::SHIFT) || code == CODE_SHIFT {
        components.push("shift".to_string());
    }
    if signal.modifiers.contains(Modifiers::CONTROL) || code == CODE_CONTROL {
        components.push("control".to_string());
    }
    if signal.modifiers.contains(Modifiers::ALT) || code == CODE_ALT {
        components.push("alt".to_string());
    }
    if signal.modifiers.contains(Modifiers::META) || code == CODE_META {
        components.push("meta".to_string());
    }

    match code {
        // bare modifier keystrokes carry no action body
        CODE_META | CODE_SHIFT | CODE_CONTROL | CODE_ALT | CODE_META_RIGHT => {}
        27 => components.push("escape".to_string()),
        37 => components.push("larrow".to_string()),
        38 => components.push("uarrow".to_string()),
        39 => components.push("rarrow".to_string()),
        40 => components.push("darrow".to_string()),
        // ASCII digits and letters map straight through, lowercased
        48..=90 => {
            let body = char::from_u32(code).unwrap_or('?').to_ascii_lowercase();
            components.push(body.to_string());
        }
        _ => components.push(format!("<{code}>")),
    }

    components.push(mode.suffix().to_string());
    components.join("-")
}

/// Canonical name for a mouse-button signal, e.g. `"mouse1-down"`.
pub fn button_event_name(signal: &ButtonSignal, mode: SignalMode) -> String {
    let mut components = modifier_components(signal.modifiers);

    match signal.button {
        0 => components.push("mouse1".to_string()),
        2 => components.push("mouse2".to_string()),
        1 => components.push("mouse3".to_string()),
        code => components.push(format!("<{code}>")),
    }

    components.push(mode.suffix().to_string());
    components.join("-")
}

/// Canonical name for a wheel signal: `"wheel-up"` or `"wheel-down"`,
/// with no mode suffix. A zero `detail` yields a body-less name.
pub fn wheel_event_name(signal: &WheelSignal) -> String {
    let mut components = modifier_components(signal.modifiers);

    match signal.detail.cmp(&0) {
        Ordering::Less => components.push("wheel-up".to_string()),
        Ordering::Greater => components.push("wheel-down".to_string()),
        Ordering::Equal => {}
    }

    components.join("-")
}

fn modifier_components(modifiers: Modifiers) -> Vec<String> {
    let mut components = Vec::new();
    if modifiers.contains(Modifiers::SHIFT) {
        components.push("shift".to_string());
    }
    if modifiers.contains(Modifiers::CONTROL) {
        components.push("control".to_string());
    }
    if modifiers.contains(Modifiers::ALT) {
        components.push("alt".to_string());
    }
    if modifiers.contains(Modifiers::META) {
        components.push("meta".to_string());
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u32, modifiers: Modifiers) -> KeySignal {
        KeySignal { code, modifiers }
    }

    #[test]
    fn letter_with_shift_held() {
        let name = key_event_name(&key(65, Modifiers::SHIFT), SignalMode::Down);
        assert_eq!(name, "shift-a-down");
    }

    #[test]
    fn arrow_key_release() {
        let name = key_event_name(&key(37, Modifiers::empty()), SignalMode::Up);
        assert_eq!(name, "larrow-up");
    }

    #[test]
    fn escape_key() {
        let name = key_event_name(&key(27, Modifiers::empty()), SignalMode::Down);
        assert_eq!(name, "escape-down");
    }

    #[test]
    fn digit_maps_to_literal_character() {
        let name = key_event_name(&key(53, Modifiers::empty()), SignalMode::Down);
        assert_eq!(name, "5-down");
    }

    #[test]
    fn unknown_code_is_bracketed() {
        let name = key_event_name(&key(112, Modifiers::empty()), SignalMode::Down);
        assert_eq!(name, "<112>-down");
    }

    #[test]
    fn bare_modifier_keystroke_has_no_body() {
        let name = key_event_name(&key(16, Modifiers::empty()), SignalMode::Down);
        assert_eq!(name, "shift-down");
        let name = key_event_name(&key(18, Modifiers::empty()), SignalMode::Up);
        assert_eq!(name, "alt-up");
    }

    #[test]
    fn modifier_prefixes_keep_fixed_order() {
        let modifiers = Modifiers::META | Modifiers::CONTROL | Modifiers::SHIFT;
        let name = key_event_name(&key(90, modifiers), SignalMode::Down);
        assert_eq!(name, "shift-control-meta-z-down");
    }

    #[test]
    fn primary_mouse_button() {
        let signal = ButtonSignal {
            button: 0,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(button_event_name(&signal, SignalMode::Down), "mouse1-down");
    }

    #[test]
    fn middle_button_is_mouse3() {
        let signal = ButtonSignal {
            button: 1,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(button_event_name(&signal, SignalMode::Up), "mouse3-up");
    }

    #[test]
    fn wheel_direction_and_suffixless_name() {
        let up = WheelSignal {
            detail: -3,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(wheel_event_name(&up), "wheel-up");

        let down = WheelSignal {
            detail: 1,
            modifiers: Modifiers::ALT,
        };
        assert_eq!(wheel_event_name(&down), "alt-wheel-down");
    }

    #[test]
    fn zero_detail_wheel_degenerates_to_modifiers_only() {
        let signal = WheelSignal {
            detail: 0,
            modifiers: Modifiers::SHIFT,
        };
        assert_eq!(wheel_event_name(&signal), "shift");

        let empty = WheelSignal {
            detail: 0,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(wheel_event_name(&empty), "");
    }
}
