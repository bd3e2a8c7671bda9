//! The locomotive table.
//!
//! [`LocomotiveRegistry`] is the call contract the interpreter relies on.
//! [`Roster`] is the host implementation: a bounded vector kept in
//! ascending address order.

use serde::{Deserialize, Serialize};

use crate::model::{Address, LocomotiveRecord, NAME_MAX_LEN};

/// Why a registry mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("loc {0} already present")]
    AlreadyPresent(Address),

    #[error("loc {0} not present")]
    NotFound(Address),

    #[error("roster full ({0} locs)")]
    Full(usize),
}

pub type Result<T> = core::result::Result<T, RegistryError>;

/// Operations the console performs on the locomotive table.
pub trait LocomotiveRegistry {
    /// Inserts a record. Fails on a duplicate address or a full table.
    fn add(&mut self, address: Address, functions: &[u8]) -> Result<()>;

    /// Removes the record with this address.
    fn remove(&mut self, address: Address) -> Result<()>;

    /// Position of the record with this address, `None` when absent.
    fn index_of(&self, address: Address) -> Option<usize>;

    /// Copy of the function map stored for this address.
    fn functions(&self, address: Address) -> Option<Vec<u8>>;

    /// Replaces the whole function map of an existing record.
    fn set_functions(&mut self, address: Address, functions: &[u8]) -> Result<()>;

    /// Sets the display name, truncated to the registry's limit.
    fn set_name(&mut self, address: Address, name: &str) -> Result<()>;

    /// Restores ascending address order.
    fn sort_by_address(&mut self);

    /// Drops every record.
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `index` in address order.
    fn get(&self, index: usize) -> Option<&LocomotiveRecord>;
}

/// Default table size.
pub const DEFAULT_CAPACITY: usize = 64;

/// In-memory locomotive table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
    locomotives: Vec<LocomotiveRecord>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for Roster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Roster {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            locomotives: Vec::new(),
        }
    }

    /// Changes the limit used for later `add` calls.
    ///
    /// Records already beyond the limit are kept.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &LocomotiveRecord> {
        self.locomotives.iter()
    }

    fn record_mut(&mut self, address: Address) -> Result<&mut LocomotiveRecord> {
        self.locomotives
            .iter_mut()
            .find(|l| l.address == address)
            .ok_or(RegistryError::NotFound(address))
    }
}

impl LocomotiveRegistry for Roster {
    fn add(&mut self, address: Address, functions: &[u8]) -> Result<()> {
        if self.index_of(address).is_some() {
            return Err(RegistryError::AlreadyPresent(address));
        }
        if self.locomotives.len() >= self.capacity {
            return Err(RegistryError::Full(self.capacity));
        }
        self.locomotives.push(LocomotiveRecord {
            address,
            functions: functions.to_vec(),
            name: None,
        });
        Ok(())
    }

    fn remove(&mut self, address: Address) -> Result<()> {
        let index = self
            .index_of(address)
            .ok_or(RegistryError::NotFound(address))?;
        self.locomotives.remove(index);
        Ok(())
    }

    fn index_of(&self, address: Address) -> Option<usize> {
        self.locomotives.iter().position(|l| l.address == address)
    }

    fn functions(&self, address: Address) -> Option<Vec<u8>> {
        self.index_of(address)
            .map(|i| self.locomotives[i].functions.clone())
    }

    fn set_functions(&mut self, address: Address, functions: &[u8]) -> Result<()> {
        let record = self.record_mut(address)?;
        record.functions = functions.to_vec();
        Ok(())
    }

    fn set_name(&mut self, address: Address, name: &str) -> Result<()> {
        let record = self.record_mut(address)?;
        let name = truncate(name, NAME_MAX_LEN);
        record.name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        Ok(())
    }

    fn sort_by_address(&mut self) {
        self.locomotives.sort_by_key(|l| l.address);
    }

    fn clear(&mut self) {
        self.locomotives.clear();
    }

    fn len(&self) -> usize {
        self.locomotives.len()
    }

    fn get(&self, index: usize) -> Option<&LocomotiveRecord> {
        self.locomotives.get(index)
    }
}

/// Longest prefix of `text` that fits in `max` bytes.
fn truncate(text: &str, max: usize) -> &str {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(addresses: &[Address]) -> Roster {
        let mut roster = Roster::default();
        for &a in addresses {
            roster.add(a, &[0, 1, 2, 3, 4]).unwrap();
        }
        roster
    }

    #[test]
    fn add_duplicate_fails() {
        let mut roster = roster_with(&[3]);
        let err = roster.add(3, &[0]).unwrap_err();

        assert_eq!(err, RegistryError::AlreadyPresent(3));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn add_beyond_capacity_fails() {
        let mut roster = Roster::with_capacity(2);
        roster.add(1, &[0]).unwrap();
        roster.add(2, &[0]).unwrap();

        assert_eq!(roster.add(3, &[0]).unwrap_err(), RegistryError::Full(2));
    }

    #[test]
    fn sort_orders_by_address() {
        let mut roster = roster_with(&[40, 3, 1000]);
        roster.sort_by_address();

        let addresses: Vec<Address> = roster.iter().map(|l| l.address).collect();
        assert_eq!(addresses, vec![3, 40, 1000]);
    }

    #[test]
    fn remove_missing_fails() {
        let mut roster = roster_with(&[3]);

        assert_eq!(roster.remove(4).unwrap_err(), RegistryError::NotFound(4));
        roster.remove(3).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn name_is_truncated() {
        let mut roster = roster_with(&[3]);
        roster.set_name(3, "Class 66 Freightliner").unwrap();

        assert_eq!(roster.get(0).unwrap().name.as_deref(), Some("Class 66 F"));
    }

    #[test]
    fn name_is_truncated_by_bytes() {
        let mut roster = roster_with(&[3]);
        roster.set_name(3, "ÄÄÄÄÄÄ").unwrap();
        assert_eq!(roster.get(0).unwrap().name.as_deref(), Some("ÄÄÄÄÄ"));

        roster.set_name(3, "🚂🚂🚂").unwrap();
        assert_eq!(roster.get(0).unwrap().name.as_deref(), Some("🚂🚂"));
    }

    #[test]
    fn empty_name_clears() {
        let mut roster = roster_with(&[3]);
        roster.set_name(3, "BR 218").unwrap();
        roster.set_name(3, "").unwrap();

        assert_eq!(roster.get(0).unwrap().name, None);
    }

    #[test]
    fn capacity_is_not_serialized() {
        let roster = roster_with(&[7]);
        let json = serde_json::to_string(&roster).unwrap();
        assert!(!json.contains("capacity"));

        let loaded: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.index_of(7), Some(0));
    }
}
