//! Display primitives shared by command output: colors and tables.

pub mod colors;
pub mod table;

pub use colors::*;
pub use table::*;

/// Bold section heading followed by an underline.
pub fn section(title: &str) -> String {
    format!(
        "{}\n{}",
        console::style(title).bold(),
        "-".repeat(title.chars().count())
    )
}
