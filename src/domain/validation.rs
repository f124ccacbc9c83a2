//! Pure validation for the public intake forms.
//!
//! Every validator trims its inputs and either returns the cleaned value or
//! the full list of field errors, so the form can be re-rendered with all
//! problems at once.

use serde::Serialize;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const SUBJECT_MIN_CHARS: usize = 5;
pub const SUBJECT_MAX_CHARS: usize = 200;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 5000;
pub const COMMENT_MAX_CHARS: usize = 2000;
pub const EMAIL_MAX_CHARS: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_result(self) -> Result<T, Vec<FieldError>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }

    fn from_parts(value: T, errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            Self::Valid(value)
        } else {
            Self::Invalid(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInput {
    pub name: String,
    pub email: String,
    pub content: String,
}

pub fn validate_contact(
    name: &str,
    email: &str,
    subject: &str,
    message: &str,
) -> Validation<ContactInput> {
    let mut errors = Vec::new();
    let name = name.trim();
    let email = email.trim();
    let subject = subject.trim();
    let message = message.trim();

    check_length(
        &mut errors,
        "name",
        "Name",
        name,
        NAME_MIN_CHARS,
        NAME_MAX_CHARS,
    );
    check_email(&mut errors, email);
    check_length(
        &mut errors,
        "subject",
        "Subject",
        subject,
        SUBJECT_MIN_CHARS,
        SUBJECT_MAX_CHARS,
    );
    check_length(
        &mut errors,
        "message",
        "Message",
        message,
        MESSAGE_MIN_CHARS,
        MESSAGE_MAX_CHARS,
    );

    Validation::from_parts(
        ContactInput {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        },
        errors,
    )
}

/// Returns the lower-cased address on success.
pub fn validate_newsletter(email: &str) -> Validation<String> {
    let mut errors = Vec::new();
    let email = email.trim();
    check_email(&mut errors, email);
    Validation::from_parts(email.to_lowercase(), errors)
}

pub fn validate_comment(name: &str, email: &str, content: &str) -> Validation<CommentInput> {
    let mut errors = Vec::new();
    let name = name.trim();
    let email = email.trim();
    let content = content.trim();

    check_length(&mut errors, "name", "Name", name, 1, NAME_MAX_CHARS);
    check_email(&mut errors, email);
    check_length(
        &mut errors,
        "content",
        "Comment",
        content,
        1,
        COMMENT_MAX_CHARS,
    );

    Validation::from_parts(
        CommentInput {
            name: name.to_string(),
            email: email.to_string(),
            content: content.to_string(),
        },
        errors,
    )
}

/// Structural address check: one `@`, non-empty local part, dotted domain.
pub fn is_well_formed_email(email: &str) -> bool {
    if email.chars().count() > EMAIL_MAX_CHARS || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_well_formed_email(email) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let count = value.chars().count();
    if count == 0 {
        errors.push(FieldError::new(field, format!("{label} is required")));
    } else if count < min {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at least {min} characters long"),
        ));
    } else if count > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at most {max} characters long"),
        ));
    }
}
