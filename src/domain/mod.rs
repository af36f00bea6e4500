//! Domain types

pub mod users;

pub use users::*;
