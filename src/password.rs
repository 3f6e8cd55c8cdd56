use crate::error::ProvisionError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use clap::ValueEnum;
use std::fmt;

/// Password hashing algorithm used for the stored `password_hash`.
///
/// The application that consumes the provisioned row verifies bcrypt hashes,
/// so bcrypt is the default. Argon2id is available for stores whose login
/// flow expects PHC strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HashScheme {
    #[default]
    Bcrypt,
    Argon2,
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashScheme::Bcrypt => write!(f, "bcrypt"),
            HashScheme::Argon2 => write!(f, "argon2"),
        }
    }
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(scheme: HashScheme, password: &str) -> Result<String, ProvisionError> {
    match scheme {
        HashScheme::Bcrypt => bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| ProvisionError::Hashing(e.to_string())),
        HashScheme::Argon2 => {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::default();
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| ProvisionError::Hashing(e.to_string()))
        }
    }
}
