use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::registration::RegistrationForm;

lazy_static! {
    /// Literal `+212`, one space, three space-separated groups of three digits.
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^\+212 \d{3} \d{3} \d{3}$").expect("compile phone pattern");

    /// The closed major→allowed-years table. Served read-only so a form
    /// collaborator can repopulate its year field; the pipeline itself does
    /// not re-check the pairing at save time.
    pub static ref MAJOR_YEARS: BTreeMap<&'static str, Vec<u8>> = {
        let mut majors = BTreeMap::new();
        majors.insert("CP", vec![1, 2]);
        majors.insert("GIIA", vec![1, 2, 3]);
        majors.insert("GINF", vec![1, 2, 3]);
        majors.insert("GTR", vec![1, 2, 3]);
        majors.insert("GMSI", vec![1, 2, 3]);
        majors.insert("GINDUS", vec![1, 2, 3]);
        majors.insert("GATE", vec![1, 2, 3]);
        majors.insert("GPMA", vec![1, 2, 3]);
        majors
    };
}

/// The outcome of validating a whole form: overall validity plus one message
/// per failing field, keyed by the field's wire name.
#[derive(Clone, Debug)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: BTreeMap<&'static str, &'static str>,
}

pub fn validate_form(form: &RegistrationForm) -> Validation {
    let mut errors = BTreeMap::new();

    if let Some(message) = check_full_name(&form.full_name) {
        errors.insert("fullName", message);
    }

    if let Some(message) = check_phone_number(&form.phone_number) {
        errors.insert("phoneNumber", message);
    }

    if let Some(message) = check_gender(&form.gender) {
        errors.insert("gender", message);
    }

    if let Some(message) = check_major(&form.major) {
        errors.insert("major", message);
    }

    if let Some(message) = check_year(&form.year) {
        errors.insert("year", message);
    }

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn check_full_name(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        return Some("Full name is required");
    }

    None
}

fn check_phone_number(phone: &str) -> Option<&'static str> {
    if phone.trim().is_empty() {
        return Some("Phone number is required");
    }

    if !PHONE_PATTERN.is_match(phone) {
        return Some("Please enter a valid phone number in the format: +212 xxx xxx xxx");
    }

    None
}

fn check_gender(gender: &str) -> Option<&'static str> {
    if gender.is_empty() {
        return Some("Please select your gender");
    }

    None
}

fn check_major(major: &str) -> Option<&'static str> {
    if major.is_empty() {
        return Some("Please select your major");
    }

    None
}

fn check_year(year: &str) -> Option<&'static str> {
    if year.is_empty() {
        return Some("Please select your year");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{validate_form, MAJOR_YEARS};
    use crate::registration::RegistrationForm;

    fn filled_form() -> RegistrationForm {
        RegistrationForm {
            full_name: "Amina B.".to_owned(),
            phone_number: "+212 612 345 678".to_owned(),
            email: None,
            gender: "F".to_owned(),
            major: "GIIA".to_owned(),
            year: "2".to_owned(),
            notes: None,
        }
    }

    #[test]
    fn a_complete_form_passes() {
        let validation = validate_form(&filled_form());

        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
    }

    #[test]
    fn a_blank_name_fails_with_only_the_name_error() {
        let mut form = filled_form();
        form.full_name = "   ".to_owned();

        let validation = validate_form(&form);

        assert!(!validation.is_valid);
        assert_eq!(
            validation.errors.keys().collect::<Vec<_>>(),
            vec![&"fullName"]
        );
    }

    #[test]
    fn wrong_grouping_fails_the_phone_format() {
        let mut form = filled_form();
        form.phone_number = "+212 12 345 678".to_owned();

        let validation = validate_form(&form);

        assert_eq!(
            validation.errors.get("phoneNumber"),
            Some(&"Please enter a valid phone number in the format: +212 xxx xxx xxx")
        );
    }

    #[test]
    fn a_missing_phone_reports_the_missing_message() {
        let mut form = filled_form();
        form.phone_number = String::new();

        let validation = validate_form(&form);

        assert_eq!(
            validation.errors.get("phoneNumber"),
            Some(&"Phone number is required")
        );
    }

    #[test]
    fn an_empty_form_fails_every_required_field() {
        let form = RegistrationForm::default();

        let validation = validate_form(&form);

        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 5);
        for key in &["fullName", "phoneNumber", "gender", "major", "year"] {
            assert!(validation.errors.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn trailing_characters_fail_the_phone_format() {
        let mut form = filled_form();
        form.phone_number = "+212 612 345 678 ".to_owned();

        assert!(!validate_form(&form).is_valid);
    }

    #[test]
    fn the_major_table_is_closed() {
        assert_eq!(MAJOR_YEARS.len(), 8);
        assert_eq!(MAJOR_YEARS.get("CP"), Some(&vec![1, 2]));
        assert_eq!(MAJOR_YEARS.get("GIIA"), Some(&vec![1, 2, 3]));
    }
}
