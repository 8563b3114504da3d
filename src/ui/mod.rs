mod app;
mod store;
mod theme;
mod views;

pub use app::ClassGridApp;
pub use theme::{setup_fonts, setup_theme};
