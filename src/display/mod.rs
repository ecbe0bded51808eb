pub mod table;

pub use table::TableDisplay;

/// Whether colored output makes sense for stdout
pub fn colors_enabled(configured: bool) -> bool {
    configured && atty::is(atty::Stream::Stdout)
}
