pub mod backend;
pub mod catalog;
pub mod events;
pub mod image_cache;
pub mod listener;
pub mod messages;
pub mod mod_cache;
pub mod observable;
pub mod preference;
pub mod registry;
pub mod reindex;
pub mod storage;
pub mod ui_prefs;
pub mod version;
