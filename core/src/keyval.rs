//! Key identifiers and the symbolic key-name table.
//!
//! A `Keyval` is the platform code for a logical key, distinct from whatever
//! character it may produce. Values follow X11 keysym numbering:
//!
//! - Latin-1 keys (`a`, `2`, `numbersign`, ...) use their code point
//! - editing, keypad, function and modifier keys live in `0xff00..=0xffff`
//! - any other character is `0x0100_0000 | codepoint`
//!
//! Key files name keys symbolically; `Keyval::from_name` resolves those names.

use phf::phf_map;
use std::fmt;

/// Offset applied to Unicode code points outside Latin-1.
const UNICODE_OFFSET: u32 = 0x0100_0000;

/// Symbolic key names understood in key files.
///
/// Single ASCII letters and digits are resolved without the table.
static KEY_NAMES: phf::Map<&'static str, u32> = phf_map! {
    // Latin-1 punctuation
    "space" => 0x0020,
    "exclam" => 0x0021,
    "quotedbl" => 0x0022,
    "numbersign" => 0x0023,
    "dollar" => 0x0024,
    "percent" => 0x0025,
    "ampersand" => 0x0026,
    "apostrophe" => 0x0027,
    "parenleft" => 0x0028,
    "parenright" => 0x0029,
    "asterisk" => 0x002a,
    "plus" => 0x002b,
    "comma" => 0x002c,
    "minus" => 0x002d,
    "period" => 0x002e,
    "slash" => 0x002f,
    "colon" => 0x003a,
    "semicolon" => 0x003b,
    "less" => 0x003c,
    "equal" => 0x003d,
    "greater" => 0x003e,
    "question" => 0x003f,
    "at" => 0x0040,
    "bracketleft" => 0x005b,
    "backslash" => 0x005c,
    "bracketright" => 0x005d,
    "asciicircum" => 0x005e,
    "underscore" => 0x005f,
    "grave" => 0x0060,
    "braceleft" => 0x007b,
    "bar" => 0x007c,
    "braceright" => 0x007d,
    "asciitilde" => 0x007e,
    "nobreakspace" => 0x00a0,
    "exclamdown" => 0x00a1,
    "cent" => 0x00a2,
    "sterling" => 0x00a3,
    "section" => 0x00a7,
    "degree" => 0x00b0,
    "questiondown" => 0x00bf,

    // Latin-1 letters, multiply and division
    "Agrave" => 0x00c0,
    "Aacute" => 0x00c1,
    "Acircumflex" => 0x00c2,
    "Atilde" => 0x00c3,
    "Adiaeresis" => 0x00c4,
    "Aring" => 0x00c5,
    "AE" => 0x00c6,
    "Ccedilla" => 0x00c7,
    "Egrave" => 0x00c8,
    "Eacute" => 0x00c9,
    "Ecircumflex" => 0x00ca,
    "Ediaeresis" => 0x00cb,
    "Igrave" => 0x00cc,
    "Iacute" => 0x00cd,
    "Icircumflex" => 0x00ce,
    "Idiaeresis" => 0x00cf,
    "ETH" => 0x00d0,
    "Ntilde" => 0x00d1,
    "Ograve" => 0x00d2,
    "Oacute" => 0x00d3,
    "Ocircumflex" => 0x00d4,
    "Otilde" => 0x00d5,
    "Odiaeresis" => 0x00d6,
    "multiply" => 0x00d7,
    "Oslash" => 0x00d8,
    "Ugrave" => 0x00d9,
    "Uacute" => 0x00da,
    "Ucircumflex" => 0x00db,
    "Udiaeresis" => 0x00dc,
    "Yacute" => 0x00dd,
    "THORN" => 0x00de,
    "ssharp" => 0x00df,
    "agrave" => 0x00e0,
    "aacute" => 0x00e1,
    "acircumflex" => 0x00e2,
    "atilde" => 0x00e3,
    "adiaeresis" => 0x00e4,
    "aring" => 0x00e5,
    "ae" => 0x00e6,
    "ccedilla" => 0x00e7,
    "egrave" => 0x00e8,
    "eacute" => 0x00e9,
    "ecircumflex" => 0x00ea,
    "ediaeresis" => 0x00eb,
    "igrave" => 0x00ec,
    "iacute" => 0x00ed,
    "icircumflex" => 0x00ee,
    "idiaeresis" => 0x00ef,
    "eth" => 0x00f0,
    "ntilde" => 0x00f1,
    "ograve" => 0x00f2,
    "oacute" => 0x00f3,
    "ocircumflex" => 0x00f4,
    "otilde" => 0x00f5,
    "odiaeresis" => 0x00f6,
    "division" => 0x00f7,
    "oslash" => 0x00f8,
    "ugrave" => 0x00f9,
    "uacute" => 0x00fa,
    "ucircumflex" => 0x00fb,
    "udiaeresis" => 0x00fc,
    "yacute" => 0x00fd,
    "thorn" => 0x00fe,
    "ydiaeresis" => 0x00ff,

    // Editing and navigation
    "BackSpace" => 0xff08,
    "Tab" => 0xff09,
    "Return" => 0xff0d,
    "Escape" => 0xff1b,
    "Home" => 0xff50,
    "Left" => 0xff51,
    "Up" => 0xff52,
    "Right" => 0xff53,
    "Down" => 0xff54,
    "Page_Up" => 0xff55,
    "Page_Down" => 0xff56,
    "End" => 0xff57,
    "Insert" => 0xff63,
    "Menu" => 0xff67,
    "Delete" => 0xffff,

    // Keypad
    "KP_Space" => 0xff80,
    "KP_Tab" => 0xff89,
    "KP_Enter" => 0xff8d,
    "KP_Multiply" => 0xffaa,
    "KP_Add" => 0xffab,
    "KP_Separator" => 0xffac,
    "KP_Subtract" => 0xffad,
    "KP_Decimal" => 0xffae,
    "KP_Divide" => 0xffaf,
    "KP_0" => 0xffb0,
    "KP_1" => 0xffb1,
    "KP_2" => 0xffb2,
    "KP_3" => 0xffb3,
    "KP_4" => 0xffb4,
    "KP_5" => 0xffb5,
    "KP_6" => 0xffb6,
    "KP_7" => 0xffb7,
    "KP_8" => 0xffb8,
    "KP_9" => 0xffb9,
    "KP_Equal" => 0xffbd,

    // Function keys
    "F1" => 0xffbe,
    "F2" => 0xffbf,
    "F3" => 0xffc0,
    "F4" => 0xffc1,
    "F5" => 0xffc2,
    "F6" => 0xffc3,
    "F7" => 0xffc4,
    "F8" => 0xffc5,
    "F9" => 0xffc6,
    "F10" => 0xffc7,
    "F11" => 0xffc8,
    "F12" => 0xffc9,

    // Modifiers
    "Shift_L" => 0xffe1,
    "Shift_R" => 0xffe2,
    "Control_L" => 0xffe3,
    "Control_R" => 0xffe4,
    "Caps_Lock" => 0xffe5,
    "Shift_Lock" => 0xffe6,
    "Meta_L" => 0xffe7,
    "Meta_R" => 0xffe8,
    "Alt_L" => 0xffe9,
    "Alt_R" => 0xffea,
    "Super_L" => 0xffeb,
    "Super_R" => 0xffec,

    "VoidSymbol" => 0x00ff_ffff,
};

/// Platform key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyval(pub u32);

impl Keyval {
    /// "No key" sentinel.
    pub const VOID: Keyval = Keyval(0x00ff_ffff);

    pub const BACKSPACE: Keyval = Keyval(0xff08);
    pub const RETURN: Keyval = Keyval(0xff0d);
    pub const ESCAPE: Keyval = Keyval(0xff1b);
    pub const KP_0: Keyval = Keyval(0xffb0);
    pub const SHIFT_L: Keyval = Keyval(0xffe1);
    pub const SHIFT_R: Keyval = Keyval(0xffe2);
    pub const CONTROL_L: Keyval = Keyval(0xffe3);

    /// Resolve a symbolic key name.
    ///
    /// Accepts names from the key-name table, single ASCII letters or digits,
    /// `U<hex>` code points and raw `0x<hex>` keysyms. Returns `None` for
    /// anything else, including `VoidSymbol`.
    ///
    /// ```
    /// # use libmultipress_core::Keyval;
    /// assert_eq!(Keyval::from_name("2"), Some(Keyval(0x32)));
    /// assert_eq!(Keyval::from_name("KP_2"), Some(Keyval(0xffb2)));
    /// assert_eq!(Keyval::from_name("no-such-key"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Keyval> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let keyval = if let Some(&value) = KEY_NAMES.get(name) {
            Keyval(value)
        } else if name.len() == 1 && name.as_bytes()[0].is_ascii_alphanumeric() {
            Keyval(u32::from(name.as_bytes()[0]))
        } else if let Some(hex) = name.strip_prefix("0x") {
            Keyval(u32::from_str_radix(hex, 16).ok()?)
        } else if let Some(hex) = name.strip_prefix('U') {
            let code = u32::from_str_radix(hex, 16).ok()?;
            Keyval::from_char(char::from_u32(code)?)?
        } else {
            return None;
        };

        (keyval != Keyval::VOID).then_some(keyval)
    }

    /// Keyval for a printable character.
    ///
    /// Control characters have no keyval of their own and yield `None`.
    pub fn from_char(ch: char) -> Option<Keyval> {
        if ch.is_control() {
            return None;
        }
        let code = ch as u32;
        if is_latin1_printable(code) {
            Some(Keyval(code))
        } else {
            Some(Keyval(UNICODE_OFFSET | code))
        }
    }

    /// Name from the key-name table, if this key has one.
    pub fn name(self) -> Option<&'static str> {
        KEY_NAMES
            .entries()
            .find(|(_, &value)| value == self.0)
            .map(|(name, _)| *name)
    }

    /// Printable character produced by this key, if any.
    ///
    /// Modifiers, function keys and editing keys produce nothing. Keys whose
    /// platform mapping is a control character (Return, Tab, BackSpace) also
    /// produce nothing.
    pub fn to_unicode(self) -> Option<char> {
        let code = self.0;
        let ch = if is_latin1_printable(code) {
            char::from_u32(code)
        } else if (0x0100_0100..=0x0110_ffff).contains(&code) {
            char::from_u32(code - UNICODE_OFFSET)
        } else {
            keypad_char(code)
        }?;

        (!ch.is_control()).then_some(ch)
    }

    /// True for the shift/control/alt/meta/super/lock keys.
    pub fn is_modifier(self) -> bool {
        (0xffe1..=0xffee).contains(&self.0)
    }
}

impl fmt::Display for Keyval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        match self.to_unicode() {
            Some(ch) if ch.is_ascii_alphanumeric() => write!(f, "{}", ch),
            Some(ch) => write!(f, "U{:04X}", ch as u32),
            None => write!(f, "0x{:x}", self.0),
        }
    }
}

fn is_latin1_printable(code: u32) -> bool {
    (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code)
}

fn keypad_char(code: u32) -> Option<char> {
    match code {
        0xff80 => Some(' '),
        0xffaa => Some('*'),
        0xffab => Some('+'),
        0xffac => Some(','),
        0xffad => Some('-'),
        0xffae => Some('.'),
        0xffaf => Some('/'),
        0xffb0..=0xffb9 => char::from_digit(code - 0xffb0, 10),
        0xffbd => Some('='),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_char_names() {
        assert_eq!(Keyval::from_name("2"), Some(Keyval('2' as u32)));
        assert_eq!(Keyval::from_name("a"), Some(Keyval('a' as u32)));
        assert_eq!(Keyval::from_name("Z"), Some(Keyval('Z' as u32)));
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Keyval::from_name("numbersign"), Some(Keyval('#' as u32)));
        assert_eq!(Keyval::from_name("asterisk"), Some(Keyval('*' as u32)));
        assert_eq!(Keyval::from_name("KP_5"), Some(Keyval(0xffb5)));
        assert_eq!(Keyval::from_name("Shift_L"), Some(Keyval::SHIFT_L));
    }

    #[test]
    fn test_latin1_letter_names() {
        assert_eq!(Keyval::from_name("Agrave"), Some(Keyval(0xc0)));
        assert_eq!(Keyval::from_name("ssharp"), Some(Keyval(0xdf)));
        assert_eq!(Keyval::from_name("eacute"), Some(Keyval(0xe9)));
        assert_eq!(Keyval::from_name("adiaeresis"), Some(Keyval(0xe4)));
        assert_eq!(Keyval::from_name("ydiaeresis"), Some(Keyval(0xff)));
        assert_eq!(Keyval(0xe9).to_string(), "eacute");
        assert_eq!(Keyval::from_name("eacute").unwrap().to_unicode(), Some('é'));
    }

    #[test]
    fn test_unicode_and_hex_names() {
        assert_eq!(Keyval::from_name("U20AC"), Some(Keyval(0x0100_20ac)));
        // Latin-1 code points map onto their direct keysym
        assert_eq!(Keyval::from_name("U00E9"), Some(Keyval(0xe9)));
        assert_eq!(Keyval::from_name("0xffb2"), Some(Keyval(0xffb2)));
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(Keyval::from_name(""), None);
        assert_eq!(Keyval::from_name("VoidSymbol"), None);
        assert_eq!(Keyval::from_name("NotAKey"), None);
        assert_eq!(Keyval::from_name("!"), None);
        assert_eq!(Keyval::from_name("Uzz"), None);
    }

    #[test]
    fn test_to_unicode() {
        assert_eq!(Keyval('x' as u32).to_unicode(), Some('x'));
        assert_eq!(Keyval(0xe9).to_unicode(), Some('é'));
        assert_eq!(Keyval(0x0100_20ac).to_unicode(), Some('€'));
        assert_eq!(Keyval::KP_0.to_unicode(), Some('0'));
        assert_eq!(Keyval(0xffaa).to_unicode(), Some('*'));
    }

    #[test]
    fn test_to_unicode_none_for_non_printing() {
        assert_eq!(Keyval::SHIFT_L.to_unicode(), None);
        assert_eq!(Keyval::RETURN.to_unicode(), None);
        assert_eq!(Keyval::BACKSPACE.to_unicode(), None);
        assert_eq!(Keyval(0xffbe).to_unicode(), None); // F1
        assert_eq!(Keyval::VOID.to_unicode(), None);
    }

    #[test]
    fn test_from_char_round_trips_through_to_unicode() {
        for ch in ['a', '#', 'ß', '你', '€'] {
            let key = Keyval::from_char(ch).unwrap();
            assert_eq!(key.to_unicode(), Some(ch));
        }
        assert_eq!(Keyval::from_char('\n'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Keyval::SHIFT_L.to_string(), "Shift_L");
        assert_eq!(Keyval('2' as u32).to_string(), "2");
        assert_eq!(Keyval(0x0100_20ac).to_string(), "U20AC");
    }

    #[test]
    fn test_is_modifier() {
        assert!(Keyval::SHIFT_L.is_modifier());
        assert!(Keyval::CONTROL_L.is_modifier());
        assert!(!Keyval('a' as u32).is_modifier());
    }
}
