pub mod dispatch;
pub mod error;
pub mod gui;
pub mod hotkey;
pub mod input;
pub mod keyboard_hook;
pub mod keys;
pub mod logging;
pub mod map_feed;
pub mod settings;
pub mod settings_store;
pub mod viewport;
