//! Touch-typing finger placement.
//!
//! Maps a unit to the finger that types it on a QWERTY layout (with the
//! Nordic letters on the right little finger) and phrases the spoken hint
//! played after a wrong attempt.

use std::fmt;

use keytutor_core::types::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    LeftLittle,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    RightIndex,
    RightMiddle,
    RightRing,
    RightLittle,
    Thumb,
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Finger::LeftLittle => "left little finger",
            Finger::LeftRing => "left ring finger",
            Finger::LeftMiddle => "left middle finger",
            Finger::LeftIndex => "left index finger",
            Finger::RightIndex => "right index finger",
            Finger::RightMiddle => "right middle finger",
            Finger::RightRing => "right ring finger",
            Finger::RightLittle => "right little finger",
            Finger::Thumb => "thumb",
        };
        write!(f, "{}", name)
    }
}

/// Finger responsible for `c`, or `None` when the key is not on the layout.
pub fn finger_for(c: char) -> Option<Finger> {
    let finger = match c.to_lowercase().next().unwrap_or(c) {
        '§' | '`' | '1' | 'q' | 'a' | 'z' | '<' => Finger::LeftLittle,
        '2' | 'w' | 's' | 'x' => Finger::LeftRing,
        '3' | 'e' | 'd' | 'c' => Finger::LeftMiddle,
        '4' | '5' | 'r' | 't' | 'f' | 'g' | 'v' | 'b' => Finger::LeftIndex,
        '6' | '7' | 'y' | 'u' | 'h' | 'j' | 'n' | 'm' => Finger::RightIndex,
        '8' | 'i' | 'k' | ',' => Finger::RightMiddle,
        '9' | 'o' | 'l' | '.' => Finger::RightRing,
        '0' | 'p' | ';' | '\'' | '/' | '-' | '=' | '[' | ']' | '\\' | '+' | 'å' | 'ä'
        | 'ö' => Finger::RightLittle,
        ' ' => Finger::Thumb,
        _ => return None,
    };
    Some(finger)
}

/// Spoken hint for the unit the user failed to type.
pub fn placement_hint(unit: &Unit) -> String {
    let mut chars = unit.text.chars();
    match (chars.next(), chars.next()) {
        (Some(' '), None) => "Press the space bar with your thumb".to_string(),
        (Some(c), None) => match finger_for(c) {
            Some(finger) => format!("{} is typed with your {}", spoken(c), finger),
            None => format!("Look for the {} key", spoken(c)),
        },
        _ => format!("Type {}", unit.text),
    }
}

fn spoken(c: char) -> String {
    c.to_uppercase().collect()
}
