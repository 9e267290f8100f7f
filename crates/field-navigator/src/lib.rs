//! Field Navigator - Application Library
//!
//! Desktop shell around [`field-nav-core`](field_nav_core): an eframe app
//! that renders a walkers map, a drawn working area with dimmed surroundings,
//! and click-to-route walking directions.

mod app;

pub use app::FieldNavigatorApp;
