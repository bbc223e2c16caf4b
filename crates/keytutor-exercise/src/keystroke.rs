//! Keystroke model.
//!
//! Keys arrive either as characters or as named keys (`"Enter"`,
//! `"Backspace"`, `"Shift"`, ...). Modifier-only presses are kept distinct so
//! the state machine can drop them without producing an outcome.

use std::fmt;

/// A modifier key that never counts as input on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Control,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// Parse a key name such as `"Control"` or `"Shift"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Control" | "Ctrl" => Some(Modifier::Control),
            "Shift" => Some(Modifier::Shift),
            "Alt" | "AltGraph" => Some(Modifier::Alt),
            "Meta" | "Super" => Some(Modifier::Meta),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Control => write!(f, "Control"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

/// A single key press delivered to the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keystroke {
    /// A printable character, including space.
    Char(char),
    /// A modifier pressed on its own.
    Modifier(Modifier),
    /// Any other named key (Enter, Backspace, Tab, ...).
    Named(String),
}

impl Keystroke {
    /// Build a keystroke from a key name, the way browsers and terminals
    /// report them: one character for printable keys, a word otherwise.
    pub fn from_key_name(name: &str) -> Self {
        if let Some(modifier) = Modifier::from_name(name) {
            return Keystroke::Modifier(modifier);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Keystroke::Char(c),
            _ => Keystroke::Named(name.to_string()),
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Keystroke::Modifier(_))
    }

    /// The token compared against the expected unit, `None` for modifiers.
    pub fn token(&self) -> Option<String> {
        match self {
            Keystroke::Char(c) => Some(c.to_string()),
            Keystroke::Named(name) => Some(name.clone()),
            Keystroke::Modifier(_) => None,
        }
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keystroke::Char(c) => write!(f, "{}", c),
            Keystroke::Modifier(m) => write!(f, "{}", m),
            Keystroke::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<char> for Keystroke {
    fn from(c: char) -> Self {
        Keystroke::Char(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_name_modifiers() {
        for (name, expected) in [
            ("Control", Modifier::Control),
            ("Shift", Modifier::Shift),
            ("Alt", Modifier::Alt),
            ("Meta", Modifier::Meta),
        ] {
            assert_eq!(Keystroke::from_key_name(name), Keystroke::Modifier(expected));
            assert_eq!(expected.to_string(), name);
        }
    }

    #[test]
    fn test_from_key_name_char_and_named() {
        assert_eq!(Keystroke::from_key_name("a"), Keystroke::Char('a'));
        assert_eq!(Keystroke::from_key_name("ö"), Keystroke::Char('ö'));
        assert_eq!(Keystroke::from_key_name(" "), Keystroke::Char(' '));
        assert_eq!(
            Keystroke::from_key_name("Enter"),
            Keystroke::Named("Enter".to_string())
        );
    }

    #[test]
    fn test_token() {
        assert_eq!(Keystroke::Char('x').token().as_deref(), Some("x"));
        assert_eq!(
            Keystroke::Named("Tab".to_string()).token().as_deref(),
            Some("Tab")
        );
        assert_eq!(Keystroke::Modifier(Modifier::Shift).token(), None);
        assert!(Keystroke::Modifier(Modifier::Alt).is_modifier());
        assert!(!Keystroke::Char('a').is_modifier());
    }
}
