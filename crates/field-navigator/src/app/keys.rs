//! Map tile credential resolution
//!
//! Resolution order: `--map-key` flag, then the `FIELD_NAVIGATOR_MAP_KEY`
//! environment variable, then an HTTP fetch from `--key-url`. Exhausting all
//! three is a terminal configuration error; the app shows a blocking error
//! panel instead of a partially working map.

use crate::app::settings::Settings;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub const MAP_KEY_ENV: &str = "FIELD_NAVIGATOR_MAP_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no map credential: pass --map-key, set FIELD_NAVIGATOR_MAP_KEY, or configure --key-url"
    )]
    MissingCredential,

    #[error("credential fetch failed: {0}")]
    KeyFetch(#[from] reqwest::Error),
}

/// Filled by the resolution task, polled by the frame loop
pub type KeySlot = Arc<RwLock<Option<Result<String, ConfigError>>>>;

#[derive(Deserialize)]
struct KeyResponse {
    #[serde(rename = "apiKey")]
    api_key: String,
}

/// Client for the one-shot credential fetch
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .connect_timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("HTTP client builder failed ({e}), using defaults");
            reqwest::Client::new()
        })
}

/// The synchronous part of the resolution order: CLI beats environment.
fn static_key(cli: Option<&str>, env: Option<String>) -> Option<String> {
    if let Some(key) = cli {
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    env.filter(|key| !key.is_empty())
}

pub async fn resolve(settings: &Settings, http: &reqwest::Client) -> Result<String, ConfigError> {
    resolve_with_env(settings, http, std::env::var(MAP_KEY_ENV).ok()).await
}

/// Environment lookup injected so tests stay hermetic
async fn resolve_with_env(
    settings: &Settings,
    http: &reqwest::Client,
    env: Option<String>,
) -> Result<String, ConfigError> {
    if let Some(key) = static_key(settings.map_key.as_deref(), env) {
        tracing::debug!("Using map credential from flag or environment");
        return Ok(key);
    }

    let Some(url) = &settings.key_url else {
        return Err(ConfigError::MissingCredential);
    };

    tracing::info!("Fetching map credential from {url}");
    let response = http.get(url).send().await?.error_for_status()?;
    let body: KeyResponse = response.json().await?;
    if body.api_key.is_empty() {
        return Err(ConfigError::MissingCredential);
    }
    Ok(body.api_key)
}

/// Run resolution off the UI thread and wake the frame loop when done.
pub fn spawn_resolution(
    runtime: &tokio::runtime::Handle,
    http: reqwest::Client,
    settings: Settings,
    slot: KeySlot,
    ctx: egui::Context,
) {
    runtime.spawn(async move {
        let result = resolve(&settings, &http).await;
        if let Err(e) = &result {
            tracing::error!("Map credential resolution failed: {e}");
        }
        *slot.write().await = Some(result);
        ctx.request_repaint();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_settings() -> Settings {
        Settings {
            map_key: None,
            key_url: None,
            routing_url: "https://router.example.org".into(),
            state_file: None,
            ignore_persisted: false,
            simulate_location_failure: false,
        }
    }

    #[tokio::test]
    async fn test_exhausting_all_sources_is_a_missing_credential() {
        let result = resolve_with_env(&bare_settings(), &http_client(), None).await;
        assert!(matches!(result, Err(ConfigError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_static_key_short_circuits_the_fetch() {
        // The unroutable key URL must never be contacted
        let settings = Settings {
            map_key: Some("from-cli".into()),
            key_url: Some("http://127.0.0.1:1/keys".into()),
            ..bare_settings()
        };
        let result = resolve_with_env(&settings, &http_client(), Some("from-env".into())).await;
        assert_eq!(result.ok().as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_cli_key_beats_environment() {
        assert_eq!(
            static_key(Some("from-cli"), Some("from-env".into())).as_deref(),
            Some("from-cli")
        );
        assert_eq!(
            static_key(None, Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(static_key(None, None), None);
        // Empty values are not credentials
        assert_eq!(
            static_key(Some(""), Some("from-env".into())).as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_key_response_parses_wire_shape() {
        let body: KeyResponse =
            serde_json::from_value(serde_json::json!({ "apiKey": "abc123" })).unwrap();
        assert_eq!(body.api_key, "abc123");
    }
}
