use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Field Navigator - dual-zone map navigation around a drawn working area
pub struct Settings {
    /// Map tile credential; takes precedence over FIELD_NAVIGATOR_MAP_KEY and --key-url
    #[clap(long, value_name = "KEY")]
    pub map_key: Option<String>,

    /// URL to fetch the map tile credential from when no key is given directly
    #[clap(long, value_name = "URL")]
    pub key_url: Option<String>,

    /// OSRM routing endpoint for walking directions
    #[clap(long, default_value = "https://router.project-osrm.org")]
    pub routing_url: String,

    /// Persist the view to this JSON file instead of the eframe app storage
    #[clap(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,

    /// Make the simulated location stream fail (exercises the error path)
    #[clap(long, default_value = "false")]
    pub simulate_location_failure: bool,
}

impl Settings {
    pub fn from_cli() -> Self {
        Settings::parse()
    }
}
