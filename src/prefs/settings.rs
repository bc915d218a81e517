use super::{keys, PrefStore};
use super::{DEFAULT_ANIMATION_DURATION_MS, DEFAULT_AUTO_HIDE_DELAY_MS, DEFAULT_TOP_EDGE_SENSITIVITY_PX};
use std::time::Duration;
use tracing::debug;

/// Construction-time snapshot of the immersive preferences.
///
/// Taken once when a controller is built. Later preference changes are not
/// picked up; build a new controller instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmersiveSettings {
    /// Delay before auto-hiding once nothing keeps the UI up.
    pub auto_hide_delay: Duration,
    /// Length of a full show or hide transition.
    pub animation_duration: Duration,
    /// Height of the hover hot zone in pixels, always positive.
    pub top_edge_sensitivity_px: i32,
    pub show_on_address_bar_focus: bool,
    pub show_on_keyboard_activity: bool,
}

impl Default for ImmersiveSettings {
    fn default() -> Self {
        Self {
            auto_hide_delay: Duration::from_millis(DEFAULT_AUTO_HIDE_DELAY_MS as u64),
            animation_duration: Duration::from_millis(DEFAULT_ANIMATION_DURATION_MS as u64),
            top_edge_sensitivity_px: DEFAULT_TOP_EDGE_SENSITIVITY_PX as i32,
            show_on_address_bar_focus: true,
            show_on_keyboard_activity: false,
        }
    }
}

impl ImmersiveSettings {
    /// Reads the snapshot, replacing non-positive numbers with their defaults.
    pub fn load(prefs: &dyn PrefStore) -> Self {
        let auto_hide_delay = positive_millis(
            prefs.get_int(keys::AUTO_HIDE_DELAY_MS),
            DEFAULT_AUTO_HIDE_DELAY_MS,
        );
        let animation_duration = positive_millis(
            prefs.get_int(keys::ANIMATION_DURATION_MS),
            DEFAULT_ANIMATION_DURATION_MS,
        );

        let sensitivity = prefs.get_int(keys::TOP_EDGE_SENSITIVITY_PX);
        let top_edge_sensitivity_px = if sensitivity > 0 {
            i32::try_from(sensitivity).unwrap_or(i32::MAX)
        } else {
            DEFAULT_TOP_EDGE_SENSITIVITY_PX as i32
        };

        let settings = Self {
            auto_hide_delay,
            animation_duration,
            top_edge_sensitivity_px,
            show_on_address_bar_focus: prefs.get_bool(keys::SHOW_ON_ADDRESS_BAR_FOCUS),
            show_on_keyboard_activity: prefs.get_bool(keys::SHOW_ON_KEYBOARD_ACTIVITY),
        };
        debug!("Loaded immersive settings: {:?}", settings);
        settings
    }
}

fn positive_millis(value: i64, default: i64) -> Duration {
    let millis = if value > 0 { value } else { default };
    Duration::from_millis(millis as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{MemoryPrefStore, PrefValue};

    #[test]
    fn empty_store_yields_defaults() {
        let settings = ImmersiveSettings::load(&MemoryPrefStore::new());
        assert_eq!(settings, ImmersiveSettings::default());
        assert_eq!(settings.auto_hide_delay, Duration::from_millis(2000));
        assert_eq!(settings.animation_duration, Duration::from_millis(300));
        assert_eq!(settings.top_edge_sensitivity_px, 5);
    }

    #[test]
    fn non_positive_numbers_fall_back() {
        let store = MemoryPrefStore::new()
            .with(keys::AUTO_HIDE_DELAY_MS, PrefValue::Int(0))
            .with(keys::ANIMATION_DURATION_MS, PrefValue::Int(-20))
            .with(keys::TOP_EDGE_SENSITIVITY_PX, PrefValue::Int(0));

        let settings = ImmersiveSettings::load(&store);
        assert_eq!(settings.auto_hide_delay, Duration::from_millis(2000));
        assert_eq!(settings.animation_duration, Duration::from_millis(300));
        assert_eq!(settings.top_edge_sensitivity_px, 5);
    }

    #[test]
    fn explicit_values_are_used() {
        let store = MemoryPrefStore::new()
            .with(keys::AUTO_HIDE_DELAY_MS, PrefValue::Int(750))
            .with(keys::TOP_EDGE_SENSITIVITY_PX, PrefValue::Int(10))
            .with(keys::SHOW_ON_ADDRESS_BAR_FOCUS, PrefValue::Bool(false))
            .with(keys::SHOW_ON_KEYBOARD_ACTIVITY, PrefValue::Bool(true));

        let settings = ImmersiveSettings::load(&store);
        assert_eq!(settings.auto_hide_delay, Duration::from_millis(750));
        assert_eq!(settings.top_edge_sensitivity_px, 10);
        assert!(!settings.show_on_address_bar_focus);
        assert!(settings.show_on_keyboard_activity);
    }
}
