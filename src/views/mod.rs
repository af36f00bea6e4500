//! Response shaping for handlers

pub mod users;
