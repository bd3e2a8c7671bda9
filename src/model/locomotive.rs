//! Locomotive records: one entry per decoder address.

use serde::{Deserialize, Serialize};

/// A DCC decoder address.
pub type Address = u16;

/// Lowest address the console accepts.
pub const MIN_ADDRESS: Address = 1;

/// Highest address the console accepts.
pub const MAX_ADDRESS: Address = 9999;

/// Highest decoder function number (F0..F28).
pub const FUNCTION_MAX: u8 = 28;

/// Display names are cut to this many bytes, on a character boundary.
pub const NAME_MAX_LEN: usize = 10;

/// One programmed locomotive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocomotiveRecord {
    /// Decoder address, unique within the roster.
    pub address: Address,

    /// Decoder function triggered by each button, indexed by button.
    pub functions: Vec<u8>,

    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The default function map: button `i` triggers function `i`.
pub fn default_functions(buttons: usize) -> Vec<u8> {
    (0..buttons)
        .map(|i| u8::try_from(i).unwrap_or(u8::MAX))
        .collect()
}
