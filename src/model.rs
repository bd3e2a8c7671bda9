//! Core data model for the console.
//!
//! Two things are persisted: the locomotive table and the global settings.
//! Both are plain data here; the interpreter only reaches them through the
//! [`crate::roster::LocomotiveRegistry`] and [`crate::settings::SettingsStore`]
//! seams.

mod locomotive;
mod settings;

pub use locomotive::{
    Address, FUNCTION_MAX, LocomotiveRecord, MAX_ADDRESS, MIN_ADDRESS, NAME_MAX_LEN,
    default_functions,
};
pub use settings::{IpField, NetworkSettings, Settings};
