use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// The fixed set of courses offered. Shared by the register and update
/// forms so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Course {
    Python,
    Java,
    Css,
    Javascript,
    PythonFlask,
}

impl Course {
    pub const ALL: [Course; 5] = [
        Course::Python,
        Course::Java,
        Course::Css,
        Course::Javascript,
        Course::PythonFlask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Python => "Python",
            Course::Java => "Java",
            Course::Css => "Css",
            Course::Javascript => "Javascript",
            Course::PythonFlask => "Python-flask",
        }
    }

    /// Case-insensitive lookup against the canonical course names.
    pub fn parse(input: &str) -> Option<Course> {
        let wanted = input.trim();
        Course::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Python-style `str.title()`: every alphabetic run starts uppercase,
/// the rest of the run is lowercased. Word boundaries are any
/// non-alphabetic character.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Python-style `str.capitalize()`: first character uppercased, the rest
/// lowercased. Applied to emails, so every case variant of one address
/// normalizes to the same stored value.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
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

// --- submitted form payloads ---

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub student_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub course: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: String,
}

// --- normalized outputs ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub address: String,
    pub course: Course,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub address: String,
    pub course: Course,
}

/// Validates the common name/email/address/course block shared by the
/// register and update forms, pushing failures into `errors`.
fn validate_common(
    name: &str,
    email: &str,
    address: &str,
    course: &str,
    errors: &mut Vec<FieldError>,
) -> Option<(String, String, String, Course)> {
    let name = name.trim();
    let email = email.trim();
    let address = address.trim();

    if name.is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    }
    if email.is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "invalid email address"));
    }
    if address.is_empty() {
        errors.push(FieldError::new("address", "address is required"));
    }
    let course = match Course::parse(course) {
        Some(c) => Some(c),
        None => {
            errors.push(FieldError::new("course", "select a course"));
            None
        }
    };

    if errors.is_empty() {
        Some((
            title_case(name),
            capitalize(email),
            title_case(address),
            course?,
        ))
    } else {
        None
    }
}

pub fn validate_profile_lookup(form: &ProfileForm) -> Result<String, Vec<FieldError>> {
    let name = form.student_name.trim();
    if name.is_empty() {
        return Err(vec![FieldError::new(
            "student_name",
            "student name is required",
        )]);
    }
    Ok(name.to_string())
}

pub fn validate_register(form: &RegisterForm) -> Result<Registration, Vec<FieldError>> {
    let mut errors = Vec::new();
    let common = validate_common(
        &form.name,
        &form.email,
        &form.address,
        &form.course,
        &mut errors,
    );

    if form.password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    } else if form.password != form.confirm_password {
        errors.push(FieldError::new("password", "password must match"));
    }

    match (common, errors.is_empty()) {
        (Some((name, email, address, course)), true) => Ok(Registration {
            name,
            email,
            address,
            course,
            password: form.password.clone(),
        }),
        _ => Err(errors),
    }
}

pub fn validate_update(form: &UpdateForm) -> Result<ProfileUpdate, Vec<FieldError>> {
    let mut errors = Vec::new();
    match validate_common(
        &form.name,
        &form.email,
        &form.address,
        &form.course,
        &mut errors,
    ) {
        Some((name, email, address, course)) => Ok(ProfileUpdate {
            name,
            email,
            address,
            course,
        }),
        None => Err(errors),
    }
}

/// The delete form carries nothing but the confirmation signal itself.
pub fn is_delete_confirmed(form: &DeleteForm) -> bool {
    !form.confirm.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "ada lovelace".into(),
            email: "ADA@X.COM".into(),
            address: "10 street".into(),
            course: "python".into(),
            password: "s3cret".into(),
            confirm_password: "s3cret".into(),
        }
    }

    #[test]
    fn title_case_matches_python_semantics() {
        assert_eq!(title_case("ada lovelace"), "Ada Lovelace");
        assert_eq!(title_case("10 downing street"), "10 Downing Street");
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn capitalize_matches_python_semantics() {
        assert_eq!(capitalize("ADA@X.COM"), "Ada@x.com");
        assert_eq!(capitalize("ada@x.com"), "Ada@x.com");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn course_parses_case_insensitively() {
        assert_eq!(Course::parse("python"), Some(Course::Python));
        assert_eq!(Course::parse("PYTHON-FLASK"), Some(Course::PythonFlask));
        assert_eq!(Course::parse(" Java "), Some(Course::Java));
        assert_eq!(Course::parse("haskell"), None);
        assert_eq!(Course::parse(""), None);
    }

    #[test]
    fn register_normalizes_all_fields() {
        let reg = validate_register(&register_form()).expect("valid form");
        assert_eq!(reg.name, "Ada Lovelace");
        assert_eq!(reg.email, "Ada@x.com");
        assert_eq!(reg.address, "10 Street");
        assert_eq!(reg.course, Course::Python);
        assert_eq!(reg.password, "s3cret");
    }

    #[test]
    fn register_rejects_password_mismatch() {
        let mut form = register_form();
        form.confirm_password = "different".into();
        let errors = validate_register(&form).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "password"));
    }

    #[test]
    fn register_rejects_missing_fields_and_bad_email() {
        let form = RegisterForm {
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = validate_register(&form).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"address"));
        assert!(fields.contains(&"course"));
        assert!(fields.contains(&"password"));
    }

    #[test]
    fn register_rejects_unknown_course() {
        let mut form = register_form();
        form.course = "cobol".into();
        let errors = validate_register(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "course");
    }

    #[test]
    fn update_skips_password_rules() {
        let form = UpdateForm {
            name: "grace hopper".into(),
            email: "grace@navy.mil".into(),
            address: "arlington".into(),
            course: "java".into(),
        };
        let update = validate_update(&form).expect("valid form");
        assert_eq!(update.name, "Grace Hopper");
        assert_eq!(update.email, "Grace@navy.mil");
        assert_eq!(update.course, Course::Java);
    }

    #[test]
    fn profile_lookup_requires_a_name() {
        let empty = ProfileForm {
            student_name: "   ".into(),
        };
        assert!(validate_profile_lookup(&empty).is_err());

        let ok = ProfileForm {
            student_name: " Ada ".into(),
        };
        assert_eq!(validate_profile_lookup(&ok).unwrap(), "Ada");
    }

    #[test]
    fn delete_needs_an_explicit_confirmation() {
        assert!(!is_delete_confirmed(&DeleteForm::default()));
        assert!(is_delete_confirmed(&DeleteForm {
            confirm: "yes".into()
        }));
    }
}
