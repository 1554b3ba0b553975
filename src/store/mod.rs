//! Client-local storage layer.

pub mod local;
pub mod session;

pub use local::LocalStore;
pub use session::SessionStore;

/// Storage keys as constants.
pub mod keys {
    pub const USER_PROFILE: &str = "userProfile";
    pub const THEME: &str = "theme";
    /// Email awaiting verification after signup/login
    pub const PENDING_EMAIL: &str = "pendingEmail";
}
