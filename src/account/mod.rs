//! Account rules that do not touch the database: the address book and its
//! default-address invariant, notification settings, password and profile
//! field checks.

pub mod address_book;
pub mod password;
pub mod profile;
pub mod settings;

/// Literal the caller must type to request account deletion.
pub const DELETE_CONFIRMATION: &str = "DELETE";
