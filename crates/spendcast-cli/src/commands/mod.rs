//! CLI command implementations
//!
//! Commands are organized by report:
//! - `core` - Shared utilities (config and dataset loading, JSON output)
//! - `clean` - Cleaned dataset preview and normalization stats
//! - `summary` - Category totals and monthly trend
//! - `forecast` - Next-month spend forecast
//! - `allocate` - Budget allocation
//! - `analyze` - Full report
//! - `sample` - Write the built-in sample dataset

pub mod allocate;
pub mod analyze;
pub mod clean;
pub mod core;
pub mod forecast;
pub mod sample;
pub mod summary;

// Re-export command functions for main.rs
pub use allocate::*;
pub use analyze::*;
pub use clean::*;
pub use core::*;
pub use forecast::*;
pub use sample::*;
pub use summary::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
