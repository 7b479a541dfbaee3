use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "profile_capture";
const ENV_PREFIX: &str = "PROFILE_CAPTURE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub timings: Timings,
    pub selectors: SelectorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from("data/profiles.sqlite"),
            export_dir: PathBuf::from("."),
            timings: Timings::default(),
            selectors: SelectorSettings::default(),
        }
    }
}

/// Delays and bounds for the page-interaction phases, in milliseconds / pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub ready_timeout_ms: u64,
    pub ready_poll_ms: u64,
    pub expand_pre_click_ms: u64,
    pub expand_post_click_ms: u64,
    pub expand_settle_ms: u64,
    pub scroll_step_px: u32,
    pub scroll_tick_ms: u64,
    pub post_scroll_settle_ms: u64,
    pub max_scroll_ticks: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            ready_timeout_ms: 3000,
            ready_poll_ms: 100,
            expand_pre_click_ms: 300,
            expand_post_click_ms: 800,
            expand_settle_ms: 2000,
            scroll_step_px: 300,
            scroll_tick_ms: 100,
            post_scroll_settle_ms: 2000,
            max_scroll_ticks: 2000,
        }
    }
}

impl Timings {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms.max(1))
    }

    pub fn pre_click(&self) -> Duration {
        Duration::from_millis(self.expand_pre_click_ms)
    }

    pub fn post_click(&self) -> Duration {
        Duration::from_millis(self.expand_post_click_ms)
    }

    pub fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }

    pub fn scroll_tick(&self) -> Duration {
        Duration::from_millis(self.scroll_tick_ms.max(1))
    }

    pub fn post_scroll_settle(&self) -> Duration {
        Duration::from_millis(self.post_scroll_settle_ms)
    }

    /// No delays at all. Used for saved snapshots where nothing renders asynchronously.
    pub fn immediate() -> Self {
        Timings {
            ready_timeout_ms: 0,
            ready_poll_ms: 1,
            expand_pre_click_ms: 0,
            expand_post_click_ms: 0,
            expand_settle_ms: 0,
            scroll_tick_ms: 1,
            post_scroll_settle_ms: 0,
            ..Timings::default()
        }
    }
}

/// Ordered selector priority lists. First non-empty match wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    pub name: Vec<String>,
    pub headline: Vec<String>,
    pub location: Vec<String>,
    pub about: Vec<String>,
    pub picture: Vec<String>,
    pub ready: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorSettings {
    fn default() -> Self {
        SelectorSettings {
            name: owned(&[
                "h1.text-heading-xlarge",
                ".pv-text-details__left-panel h1",
                "h1",
                "[class*=\"top-card\"] h1",
            ]),
            headline: owned(&[
                ".text-body-medium.break-words",
                ".pv-text-details__left-panel .text-body-medium",
                "[class*=\"top-card\"] [class*=\"headline\"]",
                ".pv-top-card-profile-picture__container + div .text-body-medium",
            ]),
            location: owned(&[
                ".text-body-small.inline.t-black--light.break-words",
                ".pv-text-details__left-panel .text-body-small",
                "[class*=\"top-card\"] .text-body-small",
                ".pv-top-card--list-bullet li:first-child",
            ]),
            about: owned(&[
                ".inline-show-more-text",
                ".pv-shared-text-with-see-more",
                ".full-width span[aria-hidden=\"true\"]",
                "div[class*=\"display-flex\"] span",
            ]),
            picture: owned(&[
                ".pv-top-card-profile-picture__image",
                "img[class*=\"profile-photo\"]",
            ]),
            ready: owned(&[
                "h1.text-heading-xlarge",
                "h1",
                ".pv-text-details__left-panel h1",
                "[class*=\"top-card\"]",
            ]),
        }
    }
}

/// Defaults, then `profile_capture.toml` if present, then `PROFILE_CAPTURE__*` env vars.
pub fn load() -> Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .context("Failed to read configuration")?
        .try_deserialize::<Settings>()
        .context("Invalid configuration")?;
    Ok(settings)
}
