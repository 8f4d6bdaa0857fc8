/// Reformats arbitrary phone input into the canonical `+212 xxx xxx xxx`
/// shape: non-digits are discarded, a leading `212` country code or `0` trunk
/// prefix is stripped, and the remainder is clipped to nine digits and
/// regrouped in threes. Already-canonical input comes back unchanged.
///
/// ```
/// use registrations::phone::format;
/// assert_eq!(format("0612345678"), "+212 612 345 678");
/// assert_eq!(format("+212 612 345 678"), "+212 612 345 678");
/// ```
pub fn format(value: &str) -> String {
    let mut cleaned: String = value.chars().filter(char::is_ascii_digit).collect();

    if cleaned.starts_with("212") {
        cleaned.drain(..3);
    } else if cleaned.starts_with('0') {
        cleaned.remove(0);
    }

    cleaned.truncate(9);

    let digits: Vec<char> = cleaned.chars().collect();
    let mut formatted = String::from("+212");

    for group in digits.chunks(3) {
        formatted.push(' ');
        formatted.extend(group);
    }

    formatted
}

/// Strips all whitespace from a phone number. Used only for duplicate
/// comparison; the stored value keeps its canonical spacing.
pub fn normalized_key(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{format, normalized_key};

    #[test]
    fn formatting_derives_the_canonical_shape() {
        assert_eq!(format("0612345678"), "+212 612 345 678");
        assert_eq!(format("2126  12 34 56 78"), "+212 612 345 678");
        assert_eq!(format("+212 612 345 678"), "+212 612 345 678");
    }

    #[test]
    fn formatting_clips_excess_digits() {
        assert_eq!(format("0612345678999999"), "+212 612 345 678");
    }

    #[test]
    fn formatting_handles_partial_input() {
        assert_eq!(format(""), "+212");
        assert_eq!(format("06"), "+212 6");
        assert_eq!(format("06123"), "+212 612 3");
    }

    #[test]
    fn keys_ignore_spacing() {
        assert_eq!(
            normalized_key("+212 612 345 678"),
            normalized_key("+212612345678")
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 10000, ..ProptestConfig::default()
        })]

        #[test]
        fn formatting_is_idempotent(input in "\\PC*") {
            let once = format(&input);
            prop_assert_eq!(&format(&once), &once);
        }

        #[test]
        fn formatting_never_exceeds_nine_digits(input in "\\PC*") {
            let formatted = format(&input);

            prop_assert!(formatted.starts_with("+212"));
            let digits = formatted[4..].chars().filter(char::is_ascii_digit).count();
            prop_assert!(digits <= 9, "{:?} has {} digits after the country code", formatted, digits);
        }
    }
}
