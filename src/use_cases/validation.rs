use std::collections::{BTreeMap, HashMap};

use crate::domain::ports::{ChiefInput, DigitadorInput, LeaderInput, VoterInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLength(usize),
    // Only ASCII digits; the empty string passes so optional fields stay optional.
    Digits,
    ExactDigits(usize),
}

impl Rule {
    // Message for the first violated rule, if any.
    pub fn check(&self, value: &str) -> Option<String> {
        let value = value.trim();
        match *self {
            Rule::Required if value.is_empty() => Some("This field is required".to_string()),
            Rule::MinLength(min) if !value.is_empty() && value.chars().count() < min => {
                Some(format!("Minimum length is {min}"))
            }
            Rule::Digits if !is_digits(value) => Some("Invalid format (numbers only)".to_string()),
            Rule::ExactDigits(len) if !value.is_empty() && (!is_digits(value) || value.len() != len) => {
                Some(format!("Must be exactly {len} digits"))
            }
            _ => None,
        }
    }
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|byte| byte.is_ascii_digit())
}

pub type FieldRules = &'static [(&'static str, &'static [Rule])];

pub const LOGIN_RULES: FieldRules = &[
    ("username", &[Rule::Required]),
    ("password", &[Rule::Required]),
];

pub const VOTER_REGISTER_RULES: FieldRules = &[
    ("cedula", &[Rule::Required, Rule::MinLength(6)]),
    ("nombre", &[Rule::Required, Rule::MinLength(3)]),
    ("telefono", &[Rule::Required, Rule::Digits]),
    ("leader_id", &[Rule::Required]),
];

// Corrections from the records list; phone may be cleared.
pub const VOTER_EDIT_RULES: FieldRules = &[
    ("cedula", &[Rule::Required, Rule::Digits]),
    ("nombre", &[Rule::Required, Rule::MinLength(3)]),
    ("telefono", &[Rule::Digits]),
    ("leader_id", &[Rule::Required]),
];

pub const LEADER_RULES: FieldRules = &[
    ("cedula", &[Rule::Required]),
    ("nombre", &[Rule::Required]),
    ("telefono", &[Rule::Required]),
    ("chief_id", &[Rule::Required]),
];

pub const CHIEF_RULES: FieldRules = &[
    ("nombre", &[Rule::Required]),
    ("cedula", &[Rule::Required, Rule::Digits]),
    ("telefono", &[Rule::ExactDigits(10)]),
];

pub const DIGITADOR_CREATE_RULES: FieldRules = &[
    ("username", &[Rule::Required]),
    ("fullName", &[Rule::Required]),
    ("password", &[Rule::Required]),
];

// Password may be left blank on edit to keep the current one.
pub const DIGITADOR_EDIT_RULES: FieldRules = &[
    ("username", &[Rule::Required]),
    ("fullName", &[Rule::Required]),
];

/// Field name to first failing message. Empty means the form is valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn validate(form: &HashMap<String, String>, rules: FieldRules) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for &(field, field_rules) in rules {
        let value = form.get(field).map(String::as_str).unwrap_or("");
        if let Some(message) = field_rules.iter().find_map(|rule| rule.check(value)) {
            errors.insert(field, message);
        }
    }
    errors
}

// Both login fields must be filled before the backend is asked.
pub fn credentials(username: &str, password: &str) -> Result<(), FieldErrors> {
    let form = HashMap::from([
        ("username".to_string(), username.to_string()),
        ("password".to_string(), password.to_string()),
    ]);
    ensure_valid(&form, LOGIN_RULES)
}

fn field(form: &HashMap<String, String>, name: &str) -> String {
    form.get(name).map(|value| value.trim().to_string()).unwrap_or_default()
}

fn optional_field(form: &HashMap<String, String>, name: &str) -> Option<String> {
    Some(field(form, name)).filter(|value| !value.is_empty())
}

pub fn voter_input(
    form: &HashMap<String, String>,
    editing: bool,
) -> Result<VoterInput, FieldErrors> {
    let rules = if editing {
        VOTER_EDIT_RULES
    } else {
        VOTER_REGISTER_RULES
    };
    ensure_valid(form, rules)?;
    Ok(VoterInput {
        cedula: field(form, "cedula"),
        name: field(form, "nombre"),
        phone: field(form, "telefono"),
        leader_id: field(form, "leader_id"),
    })
}

pub fn leader_input(form: &HashMap<String, String>) -> Result<LeaderInput, FieldErrors> {
    ensure_valid(form, LEADER_RULES)?;
    Ok(LeaderInput {
        cedula: field(form, "cedula"),
        name: field(form, "nombre"),
        phone: field(form, "telefono"),
        chief_id: field(form, "chief_id"),
    })
}

pub fn chief_input(form: &HashMap<String, String>) -> Result<ChiefInput, FieldErrors> {
    ensure_valid(form, CHIEF_RULES)?;
    Ok(ChiefInput {
        name: field(form, "nombre"),
        cedula: field(form, "cedula"),
        phone: optional_field(form, "telefono"),
    })
}

pub fn digitador_input(
    form: &HashMap<String, String>,
    creating: bool,
) -> Result<DigitadorInput, FieldErrors> {
    let rules = if creating {
        DIGITADOR_CREATE_RULES
    } else {
        DIGITADOR_EDIT_RULES
    };
    ensure_valid(form, rules)?;
    Ok(DigitadorInput {
        username: field(form, "username"),
        full_name: field(form, "fullName"),
        password: optional_field(form, "password"),
    })
}

fn ensure_valid(form: &HashMap<String, String>, rules: FieldRules) -> Result<(), FieldErrors> {
    let errors = validate(form, rules);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn rules_report_their_messages() {
        assert_eq!(Rule::Required.check("  ").as_deref(), Some("This field is required"));
        assert_eq!(Rule::MinLength(3).check("ab").as_deref(), Some("Minimum length is 3"));
        assert_eq!(
            Rule::Digits.check("12a").as_deref(),
            Some("Invalid format (numbers only)")
        );
        assert_eq!(
            Rule::ExactDigits(10).check("300123").as_deref(),
            Some("Must be exactly 10 digits")
        );
        assert_eq!(Rule::ExactDigits(10).check("3001234567"), None);
    }

    #[test]
    fn when_optional_value_is_blank_then_format_rules_pass() {
        assert_eq!(Rule::Digits.check(""), None);
        assert_eq!(Rule::MinLength(6).check(""), None);
        assert_eq!(Rule::ExactDigits(10).check(""), None);
    }

    #[test]
    fn when_login_fields_are_blank_then_both_are_reported() {
        let errors = credentials("", " ").expect_err("expected blank credentials to fail");

        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["password", "username"]);
        assert_eq!(credentials("admin", "secret"), Ok(()));
    }

    #[test]
    fn when_field_breaks_several_rules_then_only_the_first_is_reported() {
        let errors = validate(&form(&[("cedula", "")]), VOTER_REGISTER_RULES);

        assert_eq!(errors.get("cedula").map(String::as_str), Some("This field is required"));
        assert_eq!(errors.len(), VOTER_REGISTER_RULES.len());
    }

    #[test]
    fn when_voter_form_is_valid_then_input_is_trimmed() {
        let input = voter_input(&form(&[
            ("cedula", " 1234567 "),
            ("nombre", "Ana Perez"),
            ("telefono", "3001234567"),
            ("leader_id", "l-1"),
        ]), false)
        .expect("expected a valid voter form");

        assert_eq!(input.cedula, "1234567");
        assert_eq!(input.leader_id, "l-1");
    }

    #[test]
    fn when_editing_voter_then_phone_may_be_blank_but_cedula_must_be_numeric() {
        let values = form(&[("cedula", "12a"), ("nombre", "Ana"), ("leader_id", "l-1")]);

        let errors = voter_input(&values, true).expect_err("expected cedula format error");

        assert_eq!(
            errors.get("cedula").map(String::as_str),
            Some("Invalid format (numbers only)")
        );
        assert!(!errors.contains_key("telefono"));
    }

    #[test]
    fn when_chief_phone_is_short_then_exact_digits_is_reported() {
        let errors = validate(
            &form(&[("nombre", "Jefe"), ("cedula", "987654"), ("telefono", "300")]),
            CHIEF_RULES,
        );

        assert_eq!(
            errors.get("telefono").map(String::as_str),
            Some("Must be exactly 10 digits")
        );
    }

    #[test]
    fn when_chief_phone_is_blank_then_it_is_omitted() {
        let input = chief_input(&form(&[("nombre", "Jefe Uno"), ("cedula", "987654")]))
            .expect("expected a valid chief form");

        assert_eq!(input.phone, None);
    }

    #[test]
    fn when_editing_digitador_then_password_is_optional() {
        let values = form(&[("username", "dig01"), ("fullName", "Digitador Uno")]);

        let errors = digitador_input(&values, true).expect_err("password required on create");
        assert!(errors.contains_key("password"));

        let input = digitador_input(&values, false).expect("expected edit without password");
        assert_eq!(input.password, None);
    }

    #[test]
    fn when_login_fields_are_empty_then_both_are_required() {
        let errors = validate(&HashMap::new(), LOGIN_RULES);

        assert_eq!(errors.len(), 2);
    }
}
