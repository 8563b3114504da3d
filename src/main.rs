#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod api;
mod color;
mod config;
mod export;
mod schedule;
mod ui;

use eframe::egui;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> eframe::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting classgrid");

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 900.0])
        .with_min_inner_size([900.0, 640.0])
        .with_title("ClassGrid");

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "ClassGrid",
        options,
        Box::new(|cc| Ok(Box::new(ui::ClassGridApp::new(cc)?))),
    )
}
