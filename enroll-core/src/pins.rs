//! PIN code directory used to auto-fill city and state on the address step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// City and state a PIN code belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinLocation {
    pub city: String,
    pub state: String,
}

/// Lookup table from 6-digit PIN string to [`PinLocation`].
///
/// [`PinDirectory::default`] holds a handful of sample entries; callers can
/// swap in a full table (see the `enroll-data` crate for a CSV loader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinDirectory {
    entries: HashMap<String, PinLocation>,
}

impl Default for PinDirectory {
    fn default() -> Self {
        Self::sample()
    }
}

impl PinDirectory {
    /// A directory with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The built-in sample table.
    pub fn sample() -> Self {
        Self::from_entries([
            ("110001", "New Delhi", "Delhi"),
            ("400001", "Mumbai", "Maharashtra"),
            ("560001", "Bangalore", "Karnataka"),
        ])
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>) -> Self {
        let mut directory = Self::empty();
        for (pin, city, state) in entries {
            directory.insert(pin, PinLocation {
                city: city.to_string(),
                state: state.to_string(),
            });
        }
        directory
    }

    /// Adds or replaces the entry for `pin`.
    pub fn insert(
        &mut self,
        pin: impl Into<String>,
        location: PinLocation,
    ) {
        self.entries.insert(pin.into(), location);
    }

    /// Location for `pin`. Only complete 6-digit codes can match.
    pub fn lookup(
        &self,
        pin: &str,
    ) -> Option<&PinLocation> {
        let pin = pin.trim();
        if pin.len() != 6 || !pin.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.entries.get(pin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
