//! Application settings shared by the launcher frontends.

pub mod config;

pub use config::Config;
