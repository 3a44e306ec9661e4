//! Data models for the price card
//!
//! Market records as fetched, the derived projection, and the resolved
//! drawing description handed to the renderer.

pub mod chart;
pub mod coin;
pub mod theme;

// Re-export commonly used types for convenience
pub use chart::{Bar, BarChartSpec, CardLayout, ChartOptions, ChartProjection, OutputFormat, TOP_N};
pub use coin::CoinMarketRecord;
pub use theme::{Theme, ThemeMode};
