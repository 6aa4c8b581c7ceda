//! Terminal frontend: screen management, ascii art, and full-screen views.

pub mod art;
pub mod screen;
pub mod view;

pub use screen::{emergency_restore, Screen};
