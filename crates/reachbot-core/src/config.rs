use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

use crate::{errors::Error, Result};

/// Typed configuration, loaded from environment variables (with `.env` support).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    /// Zero means "no operator configured": every operator command is rejected.
    pub operator_id: i64,
    pub bot_name: String,
    pub db_path: PathBuf,

    // Menu surface
    pub start_image_url: Option<String>,
    pub support_url: String,
    pub channel_url: String,
    pub owner_url: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub facebook_url: String,
    pub snapchat_url: String,
    pub brand_tag: String,

    // Broadcast pacing + progress reporting
    pub broadcast_delay: Duration,
    pub progress_interval: Duration,

    // Flood control
    pub flood_window: Duration,
    pub flood_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;

        let operator_id = env_i64("OWNER_ID").unwrap_or(0);
        if operator_id == 0 {
            warn!("OWNER_ID missing; operator commands will be rejected");
        }

        let bot_name = env_str("BOT_NAME")
            .and_then(non_empty)
            .unwrap_or_else(|| "reachbot".to_string());
        let db_path = PathBuf::from(env_str("DB_PATH").unwrap_or_else(|| "bot.db".to_string()));

        let start_image_url = env_str("START_IMAGE_URL").and_then(non_empty);

        let support_url = env_url("SUPPORT_URL", "https://t.me/");
        let channel_url = env_url("CHANNEL_URL", "https://t.me/");
        let owner_url = env_url("OWNER_URL", "https://t.me/");
        let instagram_url = env_url("INSTAGRAM_URL", "https://instagram.com/");
        let youtube_url = env_url("YOUTUBE_URL", "https://youtube.com/");
        let facebook_url = env_url("FACEBOOK_URL", "https://facebook.com/");
        let snapchat_url = env_url("SNAPCHAT_URL", "https://snapchat.com/add/");

        let brand_tag = env_str("BRAND_TAG")
            .and_then(non_empty)
            .unwrap_or_else(|| "@YourBrand".to_string());

        let broadcast_delay =
            non_negative_secs("BROADCAST_DELAY", env_f64("BROADCAST_DELAY").unwrap_or(0.06))?;
        let progress_interval =
            non_negative_secs("PROGRESS_INTERVAL", env_f64("PROGRESS_INTERVAL").unwrap_or(2.5))?;

        let flood_window = Duration::from_secs(env_u64("FLOOD_WINDOW").unwrap_or(8));
        let flood_limit = env_usize("FLOOD_LIMIT").unwrap_or(7).max(1);

        Ok(Self {
            bot_token,
            operator_id,
            bot_name,
            db_path,
            start_image_url,
            support_url,
            channel_url,
            owner_url,
            instagram_url,
            youtube_url,
            facebook_url,
            snapchat_url,
            brand_tag,
            broadcast_delay,
            progress_interval,
            flood_window,
            flood_limit,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_url(key: &str, default: &str) -> String {
    env_str(key)
        .and_then(non_empty)
        .unwrap_or_else(|| default.to_string())
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    env_str(key).and_then(|s| s.trim().parse::<f64>().ok())
}

/// `Duration::from_secs_f64` panics on negative or non-finite input, so
/// fractional-seconds settings are validated here first.
fn non_negative_secs(key: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Config(format!(
            "{key} must be a non-negative number of seconds, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_seconds_accept_zero_and_positive() {
        assert_eq!(
            non_negative_secs("BROADCAST_DELAY", 0.06).unwrap(),
            Duration::from_millis(60)
        );
        assert_eq!(
            non_negative_secs("PROGRESS_INTERVAL", 0.0).unwrap(),
            Duration::ZERO
        );
    }

    #[test]
    fn fractional_seconds_reject_negative_and_non_finite() {
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let err = non_negative_secs("BROADCAST_DELAY", bad).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{bad} must be rejected");
        }
    }
}
