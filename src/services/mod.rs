// src/services/mod.rs
//
// Shared services used across domain modules

pub mod email;

pub use email::{DisabledMailer, Mailer, SendGridMailer};
