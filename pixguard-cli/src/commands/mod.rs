//! Subcommand implementations.

pub mod compare;
pub mod detect;
pub mod hash;
pub mod inspect;
pub mod protect;
pub mod reveal;
pub mod stamp;
