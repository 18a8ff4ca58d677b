//! Password hashing. One hashed-credential path only; there is deliberately
//! no way to compare a submitted password against anything but a bcrypt hash.

use crate::config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
