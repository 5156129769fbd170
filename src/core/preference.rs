use crate::core::observable::{Observable, Subscription};
use crate::core::storage::KeyValueStorage;
use std::sync::Arc;
use tracing::{debug, warn};

/// A scalar that can be stored as a string under a storage key.
pub trait PreferenceValue: Clone + PartialOrd + Send + Sync + 'static {
    /// Parses a stored value; `None` means "treat as absent".
    fn decode(raw: &str) -> Option<Self>;
    fn encode(&self) -> String;

    /// Whether the value may be stored at all; rejected values leave the preference unchanged.
    fn is_storable(&self) -> bool {
        true
    }
}

impl PreferenceValue for f64 {
    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn encode(&self) -> String {
        self.to_string()
    }

    fn is_storable(&self) -> bool {
        self.is_finite()
    }
}

impl PreferenceValue for i64 {
    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn encode(&self) -> String {
        self.to_string()
    }
}

impl PreferenceValue for bool {
    fn decode(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn encode(&self) -> String {
        self.to_string()
    }
}

impl PreferenceValue for String {
    fn decode(raw: &str) -> Option<Self> {
        (!raw.is_empty()).then(|| raw.to_string())
    }

    fn encode(&self) -> String {
        self.clone()
    }
}

/// Inclusive range a preference is clamped into. Either end may be open.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Clone> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn clamp(&self, value: T) -> T {
        let value = match &self.min {
            Some(min) if value < *min => min.clone(),
            _ => value,
        };
        match &self.max {
            Some(max) if value > *max => max.clone(),
            _ => value,
        }
    }
}

/// A durable preference: hydrated from storage on creation, written through on every change.
///
/// Storage failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct Preference<T> {
    key: Arc<str>,
    storage: Arc<dyn KeyValueStorage>,
    bounds: Option<Bounds<T>>,
    value: Observable<T>,
}

impl<T: PreferenceValue> Preference<T> {
    pub fn create(
        storage: Arc<dyn KeyValueStorage>,
        key: &str,
        fallback: T,
        bounds: Option<Bounds<T>>,
    ) -> Self {
        let stored = match storage.get_item(key) {
            Ok(raw) => raw.and_then(|raw| {
                let decoded = T::decode(&raw);
                if decoded.is_none() {
                    debug!("ignoring unparsable value for {key}: {raw:?}");
                }
                decoded
            }),
            Err(e) => {
                warn!("Failed to read preference {key}: {e}");
                None
            }
        };

        let mut initial = stored.unwrap_or(fallback);
        if let Some(b) = &bounds {
            initial = b.clamp(initial);
        }

        let pref = Self {
            key: Arc::from(key),
            storage,
            bounds,
            value: Observable::new(initial.clone()),
        };
        pref.persist(&initial);
        pref
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Clamps, persists and publishes `value`. Values that cannot be stored
    /// (non-finite numbers) are ignored.
    pub fn set(&self, value: T) {
        if !value.is_storable() {
            warn!("Ignoring unstorable value for preference {}", self.key);
            return;
        }
        let value = match &self.bounds {
            Some(b) => b.clamp(value),
            None => value,
        };
        self.persist(&value);
        self.value.set(value);
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.get());
        self.set(next);
    }

    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.value.subscribe(f)
    }

    pub fn observable(&self) -> Observable<T> {
        self.value.clone()
    }

    fn persist(&self, value: &T) {
        if let Err(e) = self.storage.set_item(&self.key, &value.encode()) {
            warn!("Failed to persist preference {}: {e}", self.key);
        }
    }
}
