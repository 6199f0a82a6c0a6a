//! Pages
//!
//! One component per route.

mod auth;
mod dashboard;
mod profile;

pub use auth::AuthPage;
pub use dashboard::DashboardPage;
pub use profile::{load_avatar, ProfilePage};
