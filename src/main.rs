mod app;
mod config;
mod editor;
mod syntax;
mod theme;
mod ui;

use app::VertexApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default configuration");
            config::Config::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Vertex"),
        ..Default::default()
    };

    eframe::run_native(
        "Vertex",
        options,
        Box::new(move |_cc| Ok(Box::new(VertexApp::new(config)))),
    )
}
