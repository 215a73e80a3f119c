//! Authentication Module
//! 
//! Account registration, credential checks and the single current-session
//! pointer, all persisted through the key-value store.

pub mod clock;
pub mod manager;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use manager::AuthManager;
pub use types::{AuthResult, RegistrationRequest, User};
