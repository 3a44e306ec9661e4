pub mod format;
pub mod table;

pub use format::format_usd;
pub use table::{Align, Table};
