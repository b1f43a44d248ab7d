//! Request handlers.

pub mod drafts;
pub mod edits;
pub mod health;
pub mod tasks;
pub mod templates;

pub use drafts::*;
pub use edits::*;
pub use health::*;
pub use tasks::*;
pub use templates::*;
