//! Utilities shared by the Cellrelay packages.

pub mod logger;
pub mod time;
