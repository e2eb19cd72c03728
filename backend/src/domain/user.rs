//! User registration and login primitives.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a repository.
//! Absent and blank fields are treated identically, matching the external
//! contract for both endpoints.

use std::fmt;

use zeroize::Zeroizing;

/// Role assigned to newly registered users.
pub const DEFAULT_USER_ROLE: &str = "user";

/// Status assigned to newly registered users.
pub const DEFAULT_USER_STATUS: &str = "pending";

/// Domain error returned when registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Phone was missing or blank once trimmed.
    EmptyPhone,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPhone => write!(f, "phone must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated registration payload.
///
/// ## Invariants
/// - `name`, `email`, and `phone` are trimmed and non-empty.
/// - `password` is non-empty but retains caller-provided whitespace so the
///   stored hash matches what the user will later type.
#[derive(Debug, Clone)]
pub struct Registration {
    name: String,
    email: String,
    phone: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw field inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationValidationError::EmptyName);
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(RegistrationValidationError::EmptyEmail);
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(RegistrationValidationError::EmptyPhone);
        }
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Display name for the new user.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email used for the uniqueness check and later logins.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Contact phone number.
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Raw password, to be hashed before persistence.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Fields persisted when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email; uniqueness is checked before insert.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Argon2id hash of the registration password.
    pub password_hash: String,
    /// Role label, `"user"` for self-registration.
    pub role: String,
    /// Account status, `"pending"` until activated elsewhere.
    pub status: String,
}

impl NewUser {
    /// Build the persisted form of a registration with a hashed password.
    pub fn from_registration(registration: &Registration, password_hash: String) -> Self {
        Self {
            name: registration.name().to_owned(),
            email: registration.email().to_owned(),
            phone: registration.phone().to_owned(),
            password_hash,
            role: DEFAULT_USER_ROLE.to_owned(),
            status: DEFAULT_USER_STATUS.to_owned(),
        }
    }
}

/// A persisted user record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned identity in hex encoding.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Stored password hash.
    pub password_hash: String,
    /// Role label.
    pub role: String,
    /// Account status.
    pub status: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for payload validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "a@b.c", "555", "pw", RegistrationValidationError::EmptyName)]
    #[case("  ", "a@b.c", "555", "pw", RegistrationValidationError::EmptyName)]
    #[case("Ada", "", "555", "pw", RegistrationValidationError::EmptyEmail)]
    #[case("Ada", "a@b.c", " ", "pw", RegistrationValidationError::EmptyPhone)]
    #[case("Ada", "a@b.c", "555", "", RegistrationValidationError::EmptyPassword)]
    fn invalid_registrations(
        #[case] name: &str,
        #[case] email: &str,
        #[case] phone: &str,
        #[case] password: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(name, email, phone, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn registration_trims_identity_fields() {
        let registration = Registration::try_from_parts("  Ada ", " ada@example.com ", " 555 ", " pw ")
            .expect("valid inputs should succeed");
        assert_eq!(registration.name(), "Ada");
        assert_eq!(registration.email(), "ada@example.com");
        assert_eq!(registration.phone(), "555");
        // Passwords keep surrounding whitespace.
        assert_eq!(registration.password(), " pw ");
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("a@b.c", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err =
            LoginCredentials::try_from_parts(email, password).expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn new_user_defaults_role_and_status() {
        let registration =
            Registration::try_from_parts("Ada", "ada@example.com", "555", "pw").expect("valid");
        let user = NewUser::from_registration(&registration, "hash".into());
        assert_eq!(user.role, "user");
        assert_eq!(user.status, "pending");
        assert_eq!(user.password_hash, "hash");
    }
}
