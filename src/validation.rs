//! Declarative request validation.
//!
//! A request type lists its fields through [`Validate`]: the JSON name, the
//! value, and the ordered rules that apply. [`Validator`] runs the rules and
//! collects one message per failed rule, keyed by the JSON field name.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Field name (as seen on the wire) to its messages, in rule order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Alphanum,
    Min(usize),
    Max(usize),
    Email,
    FullName,
}

impl Rule {
    fn message(&self) -> String {
        match self {
            Rule::Required => "This field is required".to_string(),
            Rule::Alphanum => "This field can have only alphanumeric characters".to_string(),
            Rule::Min(n) => format!("This field must have at least {n} characters"),
            Rule::Max(n) => format!("This field can have at most {n} characters"),
            Rule::Email => "The email address is invalid".to_string(),
            Rule::FullName => "Full name must have at least first name and last name each with at least 2 & at max 50 characters & separated by space".to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::Alphanum => f.write_str("alphanum"),
            Rule::Min(n) => write!(f, "min={n}"),
            Rule::Max(n) => write!(f, "max={n}"),
            Rule::Email => f.write_str("email"),
            Rule::FullName => f.write_str("full_name"),
        }
    }
}

/// The value of a field; `None` means the client left it out.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Str(Option<&'a str>),
    Bool(Option<bool>),
}

#[derive(Debug)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: Value<'a>,
    pub rules: &'static [Rule],
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: Value<'a>, rules: &'static [Rule]) -> Self {
        Self { name, value, rules }
    }
}

pub trait Validate {
    fn fields(&self) -> Vec<Field<'_>>;
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("request failed validation on {} field(s)", .0.len())]
    Fields(FieldErrors),
    #[error("rule `{rule}` cannot be applied to field `{field}`")]
    Engine { field: &'static str, rule: Rule },
}

const EMAIL_PATTERN: &str = r#"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"#;
const FULL_NAME_PATTERN: &str = r"^[a-zA-Z]{2,50}(?:\s+[a-zA-Z.'-]{2,50})+$";

pub struct Validator {
    email: Regex,
    full_name: Regex,
}

impl Validator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            full_name: Regex::new(FULL_NAME_PATTERN)?,
        })
    }

    pub fn validate<T: Validate + ?Sized>(&self, request: &T) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();

        for field in request.fields() {
            let messages = self.check_field(&field)?;
            if !messages.is_empty() {
                errors.entry(field.name.to_string()).or_default().extend(messages);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(errors))
        }
    }

    fn check_field(&self, field: &Field<'_>) -> Result<Vec<String>, ValidationError> {
        let mut messages = Vec::new();

        for rule in field.rules {
            let passed = match (rule, field.value) {
                (Rule::Required, Value::Str(value)) => value.is_some_and(|s| !s.is_empty()),
                (Rule::Required, Value::Bool(value)) => value.is_some(),
                (_, Value::Bool(_)) => {
                    return Err(ValidationError::Engine {
                        field: field.name,
                        rule: *rule,
                    })
                }
                (_, Value::Str(None)) => true,
                // An empty required field reports only the missing value.
                (_, Value::Str(Some(""))) if field.rules.contains(&Rule::Required) => true,
                (rule, Value::Str(Some(s))) => self.check_str(rule, s),
            };

            if !passed {
                messages.push(rule.message());
            }
        }

        Ok(messages)
    }

    fn check_str(&self, rule: &Rule, s: &str) -> bool {
        match rule {
            Rule::Required => !s.is_empty(),
            Rule::Alphanum => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()),
            Rule::Min(n) => s.chars().count() >= *n,
            Rule::Max(n) => s.chars().count() <= *n,
            Rule::Email => self.email.is_match(s),
            Rule::FullName => self.full_name.is_match(s),
        }
    }
}
