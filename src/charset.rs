//! The fixed character classes passwords are built from.

use std::fmt;

static UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
static LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
static DIGITS: &[u8] = b"0123456789";
static SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]";

/// One of the four character classes a password may draw from.
///
/// Each class is bound to a fixed ASCII set, and no character belongs to more than one set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CharacterClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharacterClass {
    /// Every class, in the order minimums are filled and the combined charset is built.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Upper,
        CharacterClass::Lower,
        CharacterClass::Digit,
        CharacterClass::Symbol,
    ];

    pub fn charset(self) -> &'static [u8] {
        match self {
            CharacterClass::Upper => UPPER,
            CharacterClass::Lower => LOWER,
            CharacterClass::Digit => DIGITS,
            CharacterClass::Symbol => SYMBOLS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterClass::Upper => "uppercase",
            CharacterClass::Lower => "lowercase",
            CharacterClass::Digit => "digits",
            CharacterClass::Symbol => "symbols",
        }
    }

    pub fn contains(self, ch: char) -> bool {
        u8::try_from(ch)
            .map(|b| self.charset().contains(&b))
            .unwrap_or(false)
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the class a character belongs to, if any.
pub fn classify(ch: char) -> Option<CharacterClass> {
    CharacterClass::ALL.into_iter().find(|class| class.contains(ch))
}

/// Concatenate the charsets of the given classes, keeping `CharacterClass::ALL` order.
pub fn combined<I>(classes: I) -> Vec<u8>
where
    I: IntoIterator<Item = CharacterClass>,
{
    let mut classes = classes.into_iter().collect::<Vec<_>>();
    classes.sort_by_key(|class| {
        CharacterClass::ALL
            .iter()
            .position(|c| c == class)
            .unwrap_or(usize::MAX)
    });
    classes.dedup();

    let mut charset = Vec::new();
    for class in classes {
        charset.extend_from_slice(class.charset());
    }
    charset
}
