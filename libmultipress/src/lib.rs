//! # libmultipress
//!
//! Phone-keypad style multipress input method built on libmultipress-core.

pub mod config;
pub mod engine;
pub mod presets;

// Re-export engine components from core
pub use libmultipress_core::*;

pub use config::MultipressConfig;
pub use engine::{
    create_engine, create_engine_from_file, create_engine_numeric_keypad,
    create_engine_phone_keypad,
};
pub use presets::{numeric_keypad, phone_keypad, preset_key_file, preset_table, Layout};
