pub mod map_preference;
pub mod user_prefs;
