//! Mod-configuration override types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a mod in the mod manager: install directory plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModIdentity {
    pub directory: String,
    pub name: String,
}

impl ModIdentity {
    pub fn new(directory: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ModIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.directory)
    }
}

/// A temporary, locked settings override for one mod: option group name
/// mapped to the selected option(s), plus the override priority the mod
/// manager should apply it at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetPayload {
    pub priority: i32,
    pub settings: BTreeMap<String, Vec<String>>,
}

impl PresetPayload {
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(
        mut self,
        group: impl Into<String>,
        options: impl IntoIterator<Item = String>,
    ) -> Self {
        self.settings.insert(group.into(), options.into_iter().collect());
        self
    }
}
