//! Data models for the PageSync dashboard API.
//!
//! Field names serialize in camelCase to match the browser dashboard.

mod dashboard;
mod page;
mod settings;
mod sitemap;
mod sync;
mod tree;

pub use dashboard::*;
pub use page::*;
pub use settings::*;
pub use sitemap::*;
pub use sync::*;
pub use tree::*;
