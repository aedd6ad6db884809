//! Domain models for the site.

pub mod project;
pub mod session;
pub mod user;

pub use project::{Project, sort_by_creation_date};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Donation, NewUser, User};
