//! Terminal output helpers.

pub mod list;
pub mod theme;

pub use theme::Theme;
