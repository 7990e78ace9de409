//! Runtime tuning for the navigation engine.
//!
//! Every knob has a compiled-in default in [`crate::consts`] and can be
//! overridden through a `COMPOSER_*` environment variable. Unparseable values
//! are logged and replaced by the default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::autopan::{AutopanConfig, Insets};
use crate::camera::ZoomBounds;
use crate::consts::{
    AUTOPAN_BUFFER_PX, AUTOPAN_STEP_PX, AUTOPAN_TICK_MS, CAMERA_SAVE_DEBOUNCE_MS, CAMERA_SAVE_MAX_WAIT_MS, MAX_ZOOM,
    MIN_ZOOM, TAP_MAX_MS, TAP_SLOP_PX, WHEEL_ZOOM_SPEED,
};
use crate::debounce::DebounceConfig;
use crate::gesture::TapThreshold;

/// All tuning for one mounted canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    pub autopan: AutopanConfig,
    pub tap: TapThreshold,
    pub debounce: DebounceConfig,
    pub zoom: ZoomBounds,
    /// Zoom change per wheel pixel while ctrl/meta is held.
    pub wheel_zoom_speed: f64,
}

impl CanvasConfig {
    /// Defaults overridden by `COMPOSER_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let autopan = AutopanConfig {
            buffer: env_distance("COMPOSER_AUTOPAN_BUFFER_PX", AUTOPAN_BUFFER_PX),
            insets: Insets {
                left: env_distance("COMPOSER_AUTOPAN_INSET_LEFT", 0.0),
                top: env_distance("COMPOSER_AUTOPAN_INSET_TOP", 0.0),
                right: env_distance("COMPOSER_AUTOPAN_INSET_RIGHT", 0.0),
                bottom: env_distance("COMPOSER_AUTOPAN_INSET_BOTTOM", 0.0),
            },
            step: env_distance("COMPOSER_AUTOPAN_STEP_PX", AUTOPAN_STEP_PX),
            tick: Duration::from_millis(env_parse("COMPOSER_AUTOPAN_TICK_MS", AUTOPAN_TICK_MS).max(1)),
        };
        let tap = TapThreshold {
            max_distance: env_distance("COMPOSER_TAP_SLOP_PX", TAP_SLOP_PX),
            max_duration: Duration::from_millis(env_parse("COMPOSER_TAP_MAX_MS", TAP_MAX_MS)),
        };
        let debounce = DebounceConfig {
            wait: Duration::from_millis(env_parse("COMPOSER_CAMERA_DEBOUNCE_MS", CAMERA_SAVE_DEBOUNCE_MS)),
            max_wait: Duration::from_millis(env_parse("COMPOSER_CAMERA_MAX_WAIT_MS", CAMERA_SAVE_MAX_WAIT_MS)),
        };
        let zoom = zoom_bounds(env_parse("COMPOSER_MIN_ZOOM", MIN_ZOOM), env_parse("COMPOSER_MAX_ZOOM", MAX_ZOOM));
        Self { autopan, tap, debounce, zoom, wheel_zoom_speed: env_distance("COMPOSER_WHEEL_ZOOM_SPEED", WHEEL_ZOOM_SPEED) }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            autopan: AutopanConfig::default(),
            tap: TapThreshold::default(),
            debounce: DebounceConfig::default(),
            zoom: ZoomBounds::default(),
            wheel_zoom_speed: WHEEL_ZOOM_SPEED,
        }
    }
}

fn zoom_bounds(min: f64, max: f64) -> ZoomBounds {
    if min > 0.0 && min.is_finite() && max.is_finite() && min <= max {
        ZoomBounds { min, max }
    } else {
        warn!(min, max, "invalid zoom bounds; using defaults");
        ZoomBounds::default()
    }
}

/// Read a pixel distance or rate. Negative and non-finite values fall back to `default`.
fn env_distance(key: &str, default: f64) -> f64 {
    let value = env_parse(key, default);
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(key, value, "config value must be finite and non-negative; using default");
        default
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, "unparseable config value; using default");
            default
        }
    }
}
