//! The Parley request pipeline.
//!
//! Composes the provider clients from `parley-voice` into the
//! conversational pipelines served over HTTP, owns the per-session chat
//! history, and decides which stage failures abort a request and which are
//! papered over with fallback values.

pub mod fallback;
pub mod orchestrator;
pub mod session;


pub use fallback::{FallbackPolicy, DEFAULT_FALLBACK_AUDIO, DEFAULT_FALLBACK_TEXT};
pub use orchestrator::Orchestrator;
pub use session::{SessionHandle, SessionStore};
