//! Form bodies and their validation
//!
//! Each form deserializes with every field optional, then a `clean` method
//! returns the typed record or the list of per-field problems.

use flangio_accounts::{NewUser, ProfileUpdate};
use flangio_common::{Envelope, FieldError};
use flangio_mongodb::IndexSpec;
use serde::Deserialize;

pub const FORM_ERROR_MESSAGE: &str = "Please correct the errors in the form.";
pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const DEFAULT_INITIAL_DOCUMENT: &str = r#"{ "foo" : "bar" }"#;

const MIN_PASSWORD_LEN: usize = 6;

pub type FormResult<T> = std::result::Result<T, Vec<FieldError>>;

/// 400 envelope for an invalid form
pub fn invalid_form(errors: Vec<FieldError>) -> Envelope {
    Envelope::field_errors(FORM_ERROR_MESSAGE, errors)
}

fn required(field: &str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, REQUIRED_MESSAGE));
    }
    value.to_string()
}

fn finish<T>(cleaned: T, errors: Vec<FieldError>) -> FormResult<T> {
    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

/// Checkbox semantics: present and not an explicit "off" value
pub fn parse_checkbox(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "0" | "false" | "off" | "no"),
    }
}

fn database_name_problem(name: &str) -> Option<&'static str> {
    if name.len() > 64 {
        Some("Database names must be at most 64 characters.")
    } else if name.chars().any(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0')) {
        Some("Database names cannot contain spaces or any of / \\ . \" $")
    } else {
        None
    }
}

fn collection_name_problem(name: &str) -> Option<&'static str> {
    if name.starts_with("system.") {
        Some("Collection names cannot start with \"system.\".")
    } else if name.contains('$') || name.contains('\0') {
        Some("Collection names cannot contain $.")
    } else {
        None
    }
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn check_email(field: &str, email: &str, errors: &mut Vec<FieldError>) {
    if !email.is_empty() && !valid_email(email) {
        errors.push(FieldError::new(field, "Enter a valid email address."));
    }
}

fn check_password_pair(
    first_field: &str,
    first: &str,
    second_field: &str,
    second: &str,
    errors: &mut Vec<FieldError>,
) {
    if first.is_empty() || second.is_empty() {
        if first.is_empty() {
            errors.push(FieldError::new(first_field, REQUIRED_MESSAGE));
        }
        if second.is_empty() {
            errors.push(FieldError::new(second_field, REQUIRED_MESSAGE));
        }
    } else if first != second {
        errors.push(FieldError::new(second_field, "The two password fields didn't match."));
    } else if first.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            first_field,
            format!("Passwords must be at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateDatabaseForm {
    pub database_name: String,
    pub collection_name: String,
    pub initial_document: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabase {
    pub database_name: String,
    pub collection_name: String,
    pub initial_document: String,
}

impl CreateDatabaseForm {
    /// `database` from the path takes the place of the form field
    pub fn clean(self, database: Option<&str>) -> FormResult<CreateDatabase> {
        let mut errors = Vec::new();
        let database_name = match database {
            Some(db) => db.to_string(),
            None => required("database_name", &self.database_name, &mut errors),
        };
        if let Some(problem) = database_name_problem(&database_name) {
            errors.push(FieldError::new("database_name", problem));
        }
        let collection_name = required("collection_name", &self.collection_name, &mut errors);
        if let Some(problem) = collection_name_problem(&collection_name) {
            errors.push(FieldError::new("collection_name", problem));
        }
        let initial_document = match self.initial_document.trim() {
            "" => DEFAULT_INITIAL_DOCUMENT.to_string(),
            doc => doc.to_string(),
        };
        finish(
            CreateDatabase {
                database_name,
                collection_name,
                initial_document,
            },
            errors,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnsureIndexForm {
    pub keys: String,
}

impl EnsureIndexForm {
    pub fn clean(self) -> FormResult<IndexSpec> {
        let mut errors = Vec::new();
        let keys = required("keys", &self.keys, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }
        IndexSpec::parse(&keys).map_err(|e| vec![FieldError::new("keys", e.to_string())])
    }
}

/// Raw JSON is passed through untouched; the validation gate judges it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentForm {
    pub document: String,
}

impl DocumentForm {
    pub fn clean(self) -> FormResult<String> {
        let mut errors = Vec::new();
        required("document", &self.document, &mut errors);
        finish(self.document, errors)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub query: String,
    pub just_one: Option<String>,
}

impl DeleteForm {
    pub fn clean(self) -> FormResult<(String, bool)> {
        let mut errors = Vec::new();
        required("query", &self.query, &mut errors);
        let just_one = parse_checkbox(self.just_one.as_deref());
        finish((self.query, just_one), errors)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn clean(self) -> FormResult<(String, String)> {
        let mut errors = Vec::new();
        let email = required("email", &self.email, &mut errors);
        if self.password.is_empty() {
            errors.push(FieldError::new("password", REQUIRED_MESSAGE));
        }
        finish((email, self.password), errors)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserCreationForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password1: String,
    pub password2: String,
}

impl UserCreationForm {
    pub fn clean(self) -> FormResult<NewUser> {
        let mut errors = Vec::new();
        let username = required("username", &self.username, &mut errors);
        if !username.is_empty()
            && !username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.push(FieldError::new(
                "username",
                "Usernames may contain only letters, numbers and @/./+/-/_ characters.",
            ));
        }
        let email = required("email", &self.email, &mut errors);
        check_email("email", &email, &mut errors);
        check_password_pair(
            "password1",
            &self.password1,
            "password2",
            &self.password2,
            &mut errors,
        );
        finish(
            NewUser {
                username,
                email,
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                password: self.password1,
            },
            errors,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserChangeForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserChangeForm {
    pub fn clean(self) -> FormResult<ProfileUpdate> {
        let mut errors = Vec::new();
        let email = required("email", &self.email, &mut errors);
        check_email("email", &email, &mut errors);
        finish(
            ProfileUpdate {
                email,
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
            },
            errors,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetPasswordForm {
    pub new_password1: String,
    pub new_password2: String,
}

impl SetPasswordForm {
    pub fn clean(self) -> FormResult<String> {
        let mut errors = Vec::new();
        check_password_pair(
            "new_password1",
            &self.new_password1,
            "new_password2",
            &self.new_password2,
            &mut errors,
        );
        finish(self.new_password1, errors)
    }
}
