//! Shared components used by the rider screens.
pub mod dialogs;
pub mod empty_state;
pub mod pico;
pub mod request_card;
pub mod request_map;
