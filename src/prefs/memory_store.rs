use super::{PrefError, PrefStore, PrefValue};
use std::collections::HashMap;

/// In-memory preference store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefStore {
    values: HashMap<String, PrefValue>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for seeding a store.
    pub fn with(mut self, key: &str, value: PrefValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), PrefError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::keys;

    #[test]
    fn set_overrides_default() {
        let mut store = MemoryPrefStore::new();
        assert!(store.get(keys::SHOW_ON_KEYBOARD_ACTIVITY).is_none());

        store.set_bool(keys::SHOW_ON_KEYBOARD_ACTIVITY, true).unwrap();

        assert_eq!(
            store.get(keys::SHOW_ON_KEYBOARD_ACTIVITY),
            Some(PrefValue::Bool(true))
        );
        assert!(store.get_bool(keys::SHOW_ON_KEYBOARD_ACTIVITY));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_seeds_values() {
        let store = MemoryPrefStore::new()
            .with(keys::TOP_EDGE_SENSITIVITY_PX, PrefValue::Int(10))
            .with(keys::SHOW_FULLSCREEN_TOOLBAR, PrefValue::Bool(true));

        assert_eq!(store.get_int(keys::TOP_EDGE_SENSITIVITY_PX), 10);
        assert!(store.get_bool(keys::SHOW_FULLSCREEN_TOOLBAR));
    }
}
