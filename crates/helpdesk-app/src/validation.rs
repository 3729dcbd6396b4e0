use std::sync::LazyLock;

use helpdesk_domain::User;
use regex::Regex;

use crate::collaborators::{FieldError, ValidationResult, Validator};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

const NAME_MIN_LEN: usize = 3;
const NAME_MAX_LEN: usize = 10;

/// Default rules for the user admin screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserValidator;

impl Validator<User> for UserValidator {
    fn validate(&self, user: &User) -> ValidationResult {
        let mut errors = Vec::new();
        check_name(&mut errors, "first_name", "First Name", &user.first_name);
        check_name(&mut errors, "last_name", "Last Name", &user.last_name);

        let email = user.email.trim();
        if email.is_empty() {
            errors.push(required("email", "Email"));
        } else if !EMAIL_RE.is_match(email) {
            errors.push(FieldError {
                field: "email",
                display_name: "Email",
                message: "Email is not a valid email.".to_owned(),
            });
        }

        ValidationResult { errors }
    }
}

fn check_name(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    display_name: &'static str,
    value: &str,
) {
    let length = value.trim().chars().count();
    let message = if length == 0 {
        format!("{display_name} is required.")
    } else if length < NAME_MIN_LEN {
        format!("{display_name} must be at least {NAME_MIN_LEN} characters.")
    } else if length > NAME_MAX_LEN {
        format!("{display_name} cannot be longer than {NAME_MAX_LEN} characters.")
    } else {
        return;
    };
    errors.push(FieldError {
        field,
        display_name,
        message,
    });
}

fn required(field: &'static str, display_name: &'static str) -> FieldError {
    FieldError {
        field,
        display_name,
        message: format!("{display_name} is required."),
    }
}

#[cfg(test)]
mod tests {
    use helpdesk_domain::User;

    use super::UserValidator;
    use crate::collaborators::Validator;

    fn user(first: &str, last: &str, email: &str) -> User {
        User {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: email.to_owned(),
            ..User::default()
        }
    }

    #[test]
    fn well_formed_user_passes() {
        let result = UserValidator.validate(&user("Grace", "Hopper", "grace@navy.mil"));
        assert!(result.is_valid(), "{result:?}");
    }

    #[test]
    fn blank_fields_are_required() {
        let result = UserValidator.validate(&user("", "  ", ""));

        let fields: Vec<&str> = result.errors.iter().map(|error| error.field).collect();
        assert_eq!(fields, vec!["first_name", "last_name", "email"]);
        assert_eq!(result.errors[0].message, "First Name is required.");
    }

    #[test]
    fn name_length_bounds_are_inclusive() {
        assert!(UserValidator.validate(&user("Ada", "Lovelace12", "a@b.io")).is_valid());

        let short = UserValidator.validate(&user("Al", "Turing", "al@b.io"));
        assert_eq!(
            short.errors_for("first_name").next().map(|error| error.message.as_str()),
            Some("First Name must be at least 3 characters.")
        );

        let long = UserValidator.validate(&user("Alan", "Turing-Church", "al@b.io"));
        assert_eq!(
            long.errors_for("last_name").next().map(|error| error.message.as_str()),
            Some("Last Name cannot be longer than 10 characters.")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["grace", "grace@", "@navy.mil", "grace@navy", "gr ace@navy.mil"] {
            let result = UserValidator.validate(&user("Grace", "Hopper", email));
            assert_eq!(result.errors_for("email").count(), 1, "{email}");
        }
    }
}
