//! Utilities for generating passwords.

use zeroize::Zeroizing;

use crate::charset::{self, CharacterClass};
use crate::entropy::EntropySource;
use crate::requirements::{Requirements, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
use crate::sampler::UnbiasedSampler;
use crate::shuffle::crypto_shuffle;
use crate::{GenerateError, Secret};

/// Bytes of pool per password character, in units of one 4-byte draw.
pub const POOL_SIZE_MULTIPLIER: usize = 2;
/// How many times a password that fails output validation is regenerated before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// Generate a password of `length` characters meeting `requirements`.
///
/// Each class's minimum is drawn from that class first, in the order upper, lower, digit, symbol;
/// the rest comes from all enabled classes combined, and the whole thing is then shuffled. The
/// result is checked before it is returned and regenerated with fresh entropy if the check fails,
/// up to [`MAX_ATTEMPTS`] times.
pub fn generate_password<E>(
    source: &mut E,
    length: usize,
    requirements: &Requirements,
) -> Result<Secret, GenerateError>
where
    E: EntropySource + ?Sized,
{
    check_request(length, requirements)?;

    with_retries(
        |attempt| generate_once(&mut *source, length, requirements, attempt),
        |password| is_valid_password(password, length, requirements),
    )
}

/// Run `attempt` until `valid` accepts its output, at most [`MAX_ATTEMPTS`] times. Errors from
/// `attempt` are returned straight away.
fn with_retries<F, V>(mut attempt: F, valid: V) -> Result<Secret, GenerateError>
where
    F: FnMut(usize) -> Result<Secret, GenerateError>,
    V: Fn(&str) -> bool,
{
    for n in 1..=MAX_ATTEMPTS {
        let password = attempt(n)?;
        if valid(password.as_str()) {
            return Ok(password);
        }
        log::error!(
            "generated password failed validation on attempt {}; regenerating",
            n
        );
    }
    Err(GenerateError::GenerationFailed(MAX_ATTEMPTS))
}

/// Like [`generate_password`], but with the length as it arrived from outside, which may be
/// negative or absurdly large.
pub fn generate_password_checked<E>(
    source: &mut E,
    length: i64,
    requirements: &Requirements,
) -> Result<Secret, GenerateError>
where
    E: EntropySource + ?Sized,
{
    let length = usize::try_from(length).map_err(|_| invalid_length(length))?;
    generate_password(source, length, requirements)
}

fn check_request(length: usize, requirements: &Requirements) -> Result<(), GenerateError> {
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) {
        return Err(invalid_length(
            i64::try_from(length).unwrap_or(i64::MAX),
        ));
    }
    if requirements.enabled_classes().next().is_none() {
        return Err(GenerateError::EmptyCharset);
    }
    let required = requirements.required_minimum();
    if required > length {
        return Err(GenerateError::RequirementsExceedLength { required, length });
    }
    Ok(())
}

fn invalid_length(length: i64) -> GenerateError {
    GenerateError::InvalidLength {
        length,
        min: MIN_PASSWORD_LEN,
        max: MAX_PASSWORD_LEN,
    }
}

fn generate_once<E>(
    source: &mut E,
    length: usize,
    requirements: &Requirements,
    attempt: usize,
) -> Result<Secret, GenerateError>
where
    E: EntropySource + ?Sized,
{
    let mut buf = Zeroizing::new(Vec::with_capacity(length));
    let pool_len = length * POOL_SIZE_MULTIPLIER * 4;
    log::debug!(
        "generating {}-character password with a {}-byte entropy pool, attempt {}",
        length,
        pool_len,
        attempt
    );

    let source = {
        let mut sampler = UnbiasedSampler::new(source, pool_len)?;
        for class in requirements.enabled_classes() {
            for _ in 0..requirements.class(class).minimum {
                buf.push(sampler.sample(class.charset())?);
            }
        }

        let combined = charset::combined(requirements.enabled_classes());
        while buf.len() < length {
            buf.push(sampler.sample(&combined)?);
        }
        sampler.into_source()
    };

    crypto_shuffle(source, &mut buf[..])?;
    Ok(Secret::from(
        buf.iter().map(|&b| char::from(b)).collect::<String>(),
    ))
}

/// How many characters of each class `password` contains, in `CharacterClass::ALL` order.
/// Characters outside every class are not counted.
pub fn class_counts(password: &str) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for ch in password.chars() {
        if let Some(class) = charset::classify(ch) {
            counts[class_index(class)] += 1;
        }
    }
    counts
}

fn class_index(class: CharacterClass) -> usize {
    match class {
        CharacterClass::Upper => 0,
        CharacterClass::Lower => 1,
        CharacterClass::Digit => 2,
        CharacterClass::Symbol => 3,
    }
}

/// Check that `password` has the requested length, uses only enabled classes, and meets every
/// enabled class's minimum.
pub fn is_valid_password(password: &str, length: usize, requirements: &Requirements) -> bool {
    if password.chars().count() != length {
        return false;
    }
    let mut counts = [0usize; 4];
    for ch in password.chars() {
        match charset::classify(ch) {
            Some(class) if requirements.class(class).include => counts[class_index(class)] += 1,
            _ => return false,
        }
    }
    CharacterClass::ALL
        .into_iter()
        .all(|class| counts[class_index(class)] >= requirements.class(class).effective_minimum())
}

#[cfg(test)]
mod tests {
    use rand::rngs::{OsRng, StdRng};
    use rand::SeedableRng;

    use super::*;
    use crate::entropy::test_rng::FailingRng;
    use crate::requirements::ClassRequirement;

    #[test]
    fn sixteen_characters_from_all_classes() {
        let reqs = Requirements::all_classes(1);
        let password = generate_password(&mut OsRng, 16, &reqs).unwrap();
        let password = password.as_str();
        assert_eq!(password.len(), 16);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| "!@#$%^&*()-_=+[]".contains(c)));
    }

    #[test]
    fn length_bounds() {
        let reqs = Requirements::all_classes(1);
        for length in [0, 11, 129, 1000] {
            let err = generate_password(&mut OsRng, length, &reqs).unwrap_err();
            assert!(
                matches!(err, GenerateError::InvalidLength { .. }),
                "{length}: {err:?}"
            );
        }
        for length in [12, 128] {
            let password = generate_password(&mut OsRng, length, &reqs).unwrap();
            assert_eq!(password.len(), length);
        }
    }

    #[test]
    fn negative_length_is_an_invalid_length() {
        let reqs = Requirements::all_classes(1);
        let err = generate_password_checked(&mut OsRng, -5, &reqs).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidLength { length: -5, .. }));
    }

    #[test]
    fn minimums_exceeding_length() {
        let mut reqs = Requirements::all_classes(3);
        reqs.symbol.minimum = 4;
        let err = generate_password(&mut OsRng, 12, &reqs).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::RequirementsExceedLength {
                required: 13,
                length: 12
            }
        ));
    }

    #[test]
    fn no_classes_enabled() {
        let reqs = Requirements {
            upper: ClassRequirement::excluded(),
            lower: ClassRequirement::excluded(),
            digit: ClassRequirement::excluded(),
            symbol: ClassRequirement::excluded(),
        };
        let err = generate_password(&mut OsRng, 16, &reqs).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyCharset));
    }

    #[test]
    fn excluded_classes_never_appear() {
        let mut reqs = Requirements::all_classes(2);
        reqs.upper.include = false;
        reqs.symbol.include = false;
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let password = generate_password(&mut rng, 40, &reqs).unwrap();
            let [upper, lower, digit, symbol] = class_counts(password.as_str());
            assert_eq!(upper, 0);
            assert_eq!(symbol, 0);
            assert!(lower >= 2 && digit >= 2);
            assert_eq!(lower + digit, 40);
        }
    }

    #[test]
    fn minimum_on_disabled_class_is_ignored() {
        let mut reqs = Requirements::all_classes(1);
        reqs.symbol = ClassRequirement {
            include: false,
            minimum: 50,
        };
        let password = generate_password(&mut OsRng, 12, &reqs).unwrap();
        assert_eq!(class_counts(password.as_str())[3], 0);
    }

    #[test]
    fn minimums_can_fill_the_whole_password() {
        let mut reqs = Requirements::all_classes(0);
        reqs.digit.minimum = 12;
        let password = generate_password(&mut OsRng, 12, &reqs).unwrap();
        assert!(password.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn passwords_differ() {
        let reqs = Requirements::all_classes(1);
        let a = generate_password(&mut OsRng, 12, &reqs).unwrap();
        let b = generate_password(&mut OsRng, 12, &reqs).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_failure_propagates() {
        let reqs = Requirements::all_classes(1);
        let err = generate_password(&mut FailingRng, 16, &reqs).unwrap_err();
        assert!(matches!(err, GenerateError::EntropyUnavailable(_)));
    }

    #[test]
    fn retries_stop_after_max_attempts() {
        let mut calls = 0;
        let err = with_retries(
            |_| {
                calls += 1;
                Ok(Secret::from("Aa1!Aa1!Aa1!".to_owned()))
            },
            |_| false,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::GenerationFailed(10)), "{err:?}");
        assert_eq!(calls, MAX_ATTEMPTS);
    }

    #[test]
    fn rejected_output_is_regenerated() {
        let mut attempts = Vec::new();
        let password = with_retries(
            |n| {
                attempts.push(n);
                Ok(Secret::from(format!("attempt-{n}")))
            },
            |password| password != "attempt-1",
        )
        .unwrap();
        assert_eq!(password.as_str(), "attempt-2");
        assert_eq!(attempts, vec![1, 2]);
    }

    #[test]
    fn attempt_errors_are_not_retried() {
        let mut calls = 0;
        let err = with_retries(
            |_| {
                calls += 1;
                Err(GenerateError::EmptyCharset)
            },
            |_| true,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyCharset));
        assert_eq!(calls, 1);
    }

    #[test]
    fn validation() {
        let reqs = Requirements::all_classes(1);
        assert!(is_valid_password("Aa1!Aa1!Aa1!", 12, &reqs));
        assert!(!is_valid_password("Aa1!Aa1!Aa1!", 13, &reqs));
        assert!(!is_valid_password("aaaa1111!!!!", 12, &reqs));
        assert!(!is_valid_password("Aa1!Aa1!Aa1~", 12, &reqs));

        let mut no_symbols = reqs;
        no_symbols.symbol.include = false;
        assert!(!is_valid_password("Aa1!Aa1!Aa1!", 12, &no_symbols));
        assert!(is_valid_password("Aa1aAa1aAa1a", 12, &no_symbols));
    }

    #[test]
    fn counts_per_class() {
        assert_eq!(class_counts("AB cd 123 !?"), [2, 2, 3, 1]);
    }
}
