use crate::charset::CharacterClass;

/// The shortest password that will be generated.
pub const MIN_PASSWORD_LEN: usize = 12;
/// The longest password that will be generated.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Whether a character class is used, and how many of its characters a password must contain.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClassRequirement {
    pub include: bool,
    pub minimum: usize,
}

impl ClassRequirement {
    pub fn included(minimum: usize) -> ClassRequirement {
        ClassRequirement {
            include: true,
            minimum,
        }
    }

    pub fn excluded() -> ClassRequirement {
        ClassRequirement {
            include: false,
            minimum: 0,
        }
    }

    /// The minimum that is actually enforced: a disabled class never requires anything.
    pub fn effective_minimum(&self) -> usize {
        if self.include {
            self.minimum
        } else {
            0
        }
    }
}

/// Per-class constraints for one password request.
///
/// A minimum set on a class whose `include` flag is off is ignored; it neither counts towards the
/// total nor forces characters of that class into the password.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Requirements {
    pub upper: ClassRequirement,
    pub lower: ClassRequirement,
    pub digit: ClassRequirement,
    pub symbol: ClassRequirement,
}

impl Requirements {
    /// Every class enabled, each with the same minimum.
    pub fn all_classes(minimum: usize) -> Requirements {
        let req = ClassRequirement::included(minimum);
        Requirements {
            upper: req,
            lower: req,
            digit: req,
            symbol: req,
        }
    }

    pub fn class(&self, class: CharacterClass) -> &ClassRequirement {
        match class {
            CharacterClass::Upper => &self.upper,
            CharacterClass::Lower => &self.lower,
            CharacterClass::Digit => &self.digit,
            CharacterClass::Symbol => &self.symbol,
        }
    }

    pub fn class_mut(&mut self, class: CharacterClass) -> &mut ClassRequirement {
        match class {
            CharacterClass::Upper => &mut self.upper,
            CharacterClass::Lower => &mut self.lower,
            CharacterClass::Digit => &mut self.digit,
            CharacterClass::Symbol => &mut self.symbol,
        }
    }

    /// The enabled classes, in fill order.
    pub fn enabled_classes(&self) -> impl Iterator<Item = CharacterClass> + '_ {
        CharacterClass::ALL
            .into_iter()
            .filter(move |class| self.class(*class).include)
    }

    /// Sum of the enforced minimums. Saturates rather than overflowing on absurd input.
    pub fn required_minimum(&self) -> usize {
        CharacterClass::ALL
            .into_iter()
            .map(|class| self.class(class).effective_minimum())
            .fold(0usize, usize::saturating_add)
    }
}
