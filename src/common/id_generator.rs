// src/common/id_generator.rs
//! Prefixed entity ids, e.g. `F_K7NP3XY2` for a feedback item.
//!
//! The random part uses Crockford's Base32 alphabet (no I, L, O or U), so
//! ids survive being read aloud or retyped from a screenshot.

use rand::Rng;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Characters after the `X_` prefix.
const RANDOM_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    User,
    Company,
    Feedback,
    /// `M_`, for message
    Comment,
    /// `K_`, for kudos
    Clap,
    /// `N_`, one per WebSocket connection; only used in logs
    Connection,
}

impl EntityPrefix {
    pub fn letter(self) -> char {
        match self {
            EntityPrefix::User => 'U',
            EntityPrefix::Company => 'C',
            EntityPrefix::Feedback => 'F',
            EntityPrefix::Comment => 'M',
            EntityPrefix::Clap => 'K',
            EntityPrefix::Connection => 'N',
        }
    }

    pub fn new_id(self) -> String {
        let mut rng = rand::thread_rng();
        let mut id = String::with_capacity(2 + RANDOM_LEN);
        id.push(self.letter());
        id.push('_');
        id.extend((0..RANDOM_LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char));
        id
    }
}

pub fn generate_user_id() -> String {
    EntityPrefix::User.new_id()
}

pub fn generate_company_id() -> String {
    EntityPrefix::Company.new_id()
}

pub fn generate_feedback_id() -> String {
    EntityPrefix::Feedback.new_id()
}

pub fn generate_comment_id() -> String {
    EntityPrefix::Comment.new_id()
}

pub fn generate_clap_id() -> String {
    EntityPrefix::Clap.new_id()
}

pub fn generate_connection_id() -> String {
    EntityPrefix::Connection.new_id()
}
