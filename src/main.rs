mod app;
mod color;
mod data;
mod state;
mod ui;

use app::AirScopeApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AirScope – Hyderabad Air Quality",
        options,
        Box::new(|_cc| {
            let mut app = AirScopeApp::default();
            // Load straight away when the default data folder is present.
            if app.state.config.dir.is_dir() {
                app.state.reload();
            }
            Ok(Box::new(app))
        }),
    )
}
