//! Services layer - business logic
//!
//! Services implement the rules above the repositories: validation,
//! role checks, and the moderation state machine. Per-request context
//! (who is acting, on what) is always passed in explicitly; nothing in
//! this layer holds ambient session state.

pub mod article;
pub mod moderation;
pub mod password;
pub mod user;

pub use article::{ArticleService, ArticleServiceError};
pub use moderation::{ModerationError, ModerationService};
pub use password::{hash_password, verify_password};
pub use user::{UserService, UserServiceError};
