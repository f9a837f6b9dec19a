//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `static_tokens` - Token table loaded from configuration
//! - `mock` - Test implementation with runtime-registered tokens

mod mock;
mod static_tokens;

pub use mock::MockSessionValidator;
pub use static_tokens::StaticTokenValidator;
