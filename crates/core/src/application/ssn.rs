//! Finnish personal identity code (henkilötunnus) checks.

use std::sync::LazyLock;

use regex::Regex;

static SSN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{6})[aA+-](\d{3})([0-9A-FHJ-NPR-Ya-fhj-npr-y])$")
        .expect("identity code pattern is valid")
});

const CHECK_CHARS: &[u8; 31] = b"0123456789ABCDEFHJKLMNPRSTUVWXY";

/// Check character for the nine digits `ddmmyy` + `nnn`.
#[must_use]
pub fn check_char(birth_date: &str, individual_number: &str) -> Option<char> {
    let digits: u64 = format!("{birth_date}{individual_number}").parse().ok()?;
    let index = usize::try_from(digits % 31).ok()?;
    CHECK_CHARS.get(index).map(|b| char::from(*b))
}

/// True when `value` is a well-formed identity code with a correct check character.
#[must_use]
pub fn is_valid(value: &str) -> bool {
    let Some(captures) = SSN_PATTERN.captures(value) else {
        return false;
    };
    let (Some(birth), Some(individual), Some(check)) =
        (captures.get(1), captures.get(2), captures.get(3))
    else {
        return false;
    };

    check_char(birth.as_str(), individual.as_str()).is_some_and(|expected| {
        check
            .as_str()
            .chars()
            .next()
            .is_some_and(|c| c.to_ascii_uppercase() == expected)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("010101-123N")]
    #[case("131052-308T")]
    #[case("010101A123N")]
    #[case("010101-123n")]
    fn test_valid_codes(#[case] code: &str) {
        assert!(is_valid(code), "{code} should be valid");
    }

    #[rstest]
    #[case("010101-123M")]
    #[case("010101X123N")]
    #[case("01010-1234N")]
    #[case("010101-123G")]
    #[case("")]
    #[case("010101-123NN")]
    fn test_invalid_codes(#[case] code: &str) {
        assert!(!is_valid(code), "{code} should be invalid");
    }

    fn arb_birth_date() -> impl Strategy<Value = String> {
        (1u32..=28, 1u32..=12, 0u32..=99).prop_map(|(d, m, y)| format!("{d:02}{m:02}{y:02}"))
    }

    proptest! {
        #[test]
        fn prop_computed_check_char_is_accepted(
            birth in arb_birth_date(),
            individual in 2u32..900,
            separator in prop::sample::select(vec!['-', '+', 'A']),
        ) {
            let individual = format!("{individual:03}");
            let check = check_char(&birth, &individual).unwrap();
            let code = format!("{birth}{separator}{individual}{check}");
            prop_assert!(is_valid(&code));
        }

        #[test]
        fn prop_wrong_check_char_is_rejected(
            birth in arb_birth_date(),
            individual in 2u32..900,
            offset in 1usize..31,
        ) {
            let individual = format!("{individual:03}");
            let check = check_char(&birth, &individual).unwrap();
            let index = CHECK_CHARS.iter().position(|b| char::from(*b) == check).unwrap();
            let wrong = char::from(CHECK_CHARS[(index + offset) % 31]);
            let code = format!("{birth}-{individual}{wrong}");
            prop_assert!(!is_valid(&code));
        }
    }
}
