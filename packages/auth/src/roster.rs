use crate::AuthError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use managme_core::types::{User, UserRole};
use tracing::debug;

/// A roster entry: the public user plus login credentials.
/// The password hash never leaves this package.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub user: User,
    pub login: String,
    password_hash: String,
}

impl RosterEntry {
    pub fn new(
        user: User,
        login: impl Into<String>,
        password: &str,
    ) -> Result<Self, AuthError> {
        Ok(RosterEntry {
            user,
            login: login.into(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }
}

/// Fixed in-memory user table; there is no registration.
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Roster { entries }
    }

    /// The stock five-user roster, passwords hashed at construction time.
    pub fn seeded() -> Result<Self, AuthError> {
        debug!("Hashing passwords for the seeded roster");
        let entries = vec![
            RosterEntry::new(
                user("user-1", "Jan", "Kowalski", UserRole::Admin),
                "admin",
                "admin123",
            )?,
            RosterEntry::new(
                user("user-2", "Anna", "Nowak", UserRole::Developer),
                "anna.dev",
                "dev123",
            )?,
            RosterEntry::new(
                user("user-3", "Piotr", "Wiśniewski", UserRole::Developer),
                "piotr.dev",
                "dev123",
            )?,
            RosterEntry::new(
                user("user-4", "Katarzyna", "Wójcik", UserRole::Devops),
                "kasia.ops",
                "ops123",
            )?,
            RosterEntry::new(
                user("user-5", "Tomasz", "Lewandowski", UserRole::Devops),
                "tomek.ops",
                "ops123",
            )?,
        ];
        Ok(Roster::new(entries))
    }

    pub fn find_by_login(&self, login: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.login == login)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.entries
            .iter()
            .find(|e| e.user.id == id)
            .map(|e| &e.user)
    }

    /// All users, credentials stripped.
    pub fn users(&self) -> Vec<User> {
        self.entries.iter().map(|e| e.user.clone()).collect()
    }
}

fn user(id: &str, first: &str, last: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
    }
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
