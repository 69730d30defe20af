use crate::config::Settings;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber.
/// `RUST_LOG` wins over `logging.level`. `logging.json = true` switches to one
/// JSON object per line; message bodies are never logged by the guard, only
/// categories and user ids.
pub fn init(settings: &Settings) {
    let level = settings
        .logging
        .level
        .clone()
        .unwrap_or_else(|| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (text_layer, json_layer) = if settings.logging.json.unwrap_or(false) {
        (None, Some(fmt::layer().json().with_target(false)))
    } else {
        (Some(fmt::layer().with_target(false)), None)
    };

    // try_init: tests and embedders may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tolerates_repeat_calls_in_either_format() {
        let mut settings = Settings::defaults("test");
        settings.logging.json = Some(true);
        init(&settings);
        settings.logging.json = Some(false);
        init(&settings);
        tracing::info!(user_id = "u1", "logging ready");
    }
}
