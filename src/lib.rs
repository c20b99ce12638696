use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub mod charset;
pub mod entropy;
pub mod password_generation;
pub mod request;
mod requirements;
pub mod sampler;
pub mod shuffle;

pub use charset::CharacterClass;
pub use entropy::{EntropyPool, EntropySource};
pub use password_generation::generate_password;
pub use requirements::{ClassRequirement, Requirements, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

/// Everything that can go wrong while generating a password.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("password length must be between {min} and {max} characters, got {length}")]
    InvalidLength { length: i64, min: usize, max: usize },
    #[error(
        "the character class minimums add up to {required}, which exceeds the requested length \
         of {length}"
    )]
    RequirementsExceedLength { required: usize, length: usize },
    #[error("at least one character class must be enabled")]
    EmptyCharset,
    #[error("cannot sample from a character set of {0} characters")]
    InvalidCharset(usize),
    #[error("secure random number generator unavailable: {0}")]
    EntropyUnavailable(#[source] rand::Error),
    #[error("failed to generate a valid password after {0} attempts")]
    GenerationFailed(usize),
}

/// A generated password. The contents are redacted from `Debug` output and wiped on drop.
#[derive(Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

opaque_debug::implement!(Secret);

impl Secret {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Secret {
        Secret(s)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
