use crate::core::preference::{Bounds, Preference};
use crate::core::storage::KeyValueStorage;
use std::sync::Arc;

pub const CURRENT_CATEGORY_KEY: &str = "currentCategory";
pub const CARD_SCALE_KEY: &str = "ui.cardScale";
pub const UPDATE_PROMPT_DISABLED_KEY: &str = "ui.updatePromptDisabled";

pub const DEFAULT_CATEGORY: &str = "Popular";
pub const CARD_SCALE_MIN: f64 = 0.75;
pub const CARD_SCALE_MAX: f64 = 1.4;

/// The persisted UI preferences.
#[derive(Clone)]
pub struct UiPreferences {
    /// Catalog view the browser opens on.
    pub current_category: Preference<String>,
    /// Size multiplier for mod cards in the grid and search views.
    pub card_scale: Preference<f64>,
    /// When set, the update-available popup is never shown.
    pub update_prompt_disabled: Preference<bool>,
}

impl UiPreferences {
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            current_category: Preference::create(
                storage.clone(),
                CURRENT_CATEGORY_KEY,
                DEFAULT_CATEGORY.to_string(),
                None,
            ),
            card_scale: Preference::create(
                storage.clone(),
                CARD_SCALE_KEY,
                1.0,
                Some(Bounds::new(CARD_SCALE_MIN, CARD_SCALE_MAX)),
            ),
            update_prompt_disabled: Preference::create(
                storage,
                UPDATE_PROMPT_DISABLED_KEY,
                false,
                None,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;

    #[test]
    fn defaults_and_persisted_values() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let prefs = UiPreferences::load(storage.clone());
        assert_eq!(prefs.current_category.get(), "Popular");
        assert_eq!(prefs.card_scale.get(), 1.0);
        assert!(!prefs.update_prompt_disabled.get());

        prefs.current_category.set("Recent".into());
        prefs.update_prompt_disabled.set(true);

        let reloaded = UiPreferences::load(storage);
        assert_eq!(reloaded.current_category.get(), "Recent");
        assert!(reloaded.update_prompt_disabled.get());
    }
}
