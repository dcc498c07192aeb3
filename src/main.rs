#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("ganttline demo"),
        ..Default::default()
    };

    eframe::run_native(
        "ganttline demo",
        options,
        Box::new(|cc| Ok(Box::new(app::DemoApp::new(cc)?))),
    )
}
