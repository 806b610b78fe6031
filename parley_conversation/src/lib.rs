#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Session-scoped conversation orchestration.
//!
//! # Key Features
//! - Persona registry with a guaranteed default fallback
//! - Message composition that strips caller-supplied system turns
//! - Bounded in-memory history per session, safe under concurrent turns
//! - Turn sequencing with an optional provider timeout

mod compose;
mod manager;
mod persona;
mod session;
mod store;

pub use compose::compose;
pub use manager::{ConversationError, ConversationManager, TurnContext};
pub use persona::{DEFAULT_PERSONA, PersonaRegistry};
pub use session::ConversationSession;
pub use store::{DEFAULT_MAX_MESSAGES, SessionError, SessionStore};
