#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

// The binary uses the library, not duplicate modules
use field_navigator::FieldNavigatorApp;

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            // Nicer default logs
            std::env::set_var("RUST_LOG", "info,wgpu_hal=warn,wgpu_core=warn,eframe=warn");
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn main() {
    setup_logging();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    rt.block_on(async {
        let native_options = eframe::NativeOptions {
            viewport: eframe::egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 720.0])
                .with_title("Field Navigator"),
            ..Default::default()
        };

        if let Err(e) = eframe::run_native(
            "Field Navigator",
            native_options,
            Box::new(|cc| Ok(Box::new(FieldNavigatorApp::new(cc)))),
        ) {
            tracing::error!("eframe exited with an error: {e}");
            std::process::exit(1);
        }
    });
}
