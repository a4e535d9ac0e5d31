//! Hook configuration entries and sets.
//!
//! A hook entry pairs a stable id with a kind-specific configuration. The
//! configuration is a trait object so new hook kinds can be added without
//! touching the code that stores, merges or routes entries.

use std::any::Any;
use std::fmt;

use crate::store::StoredHook;

use super::HookError;
use super::registry::HookRegistry;

/// Kind-specific configuration of a hook.
///
/// The kind name is derived from the concrete type and is used to route the
/// configuration to its handler and to tag it in storage.
pub trait HookConfiguration: fmt::Debug + Send + Sync + 'static {
    /// Returns the kind name of this configuration.
    fn kind(&self) -> &str;

    /// Encodes the configuration into its stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be represented as JSON.
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Clones the configuration behind a new box.
    fn clone_box(&self) -> Box<dyn HookConfiguration>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn HookConfiguration {
    /// Returns the concrete configuration if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: HookConfiguration>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Returns the concrete configuration mutably if it is a `T`.
    pub fn downcast_mut<T: HookConfiguration>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Returns true if the configuration is a `T`.
    #[must_use]
    pub fn is<T: HookConfiguration>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn HookConfiguration> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Configuration of a kind no registered handler knows.
///
/// Kept verbatim so it survives a load/store round trip. It routes to the
/// no-op handler and never fires.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownHook {
    kind: String,
    payload: serde_json::Value,
}

impl UnknownHook {
    /// Wraps a stored payload of an unknown kind.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Returns the stored payload.
    #[must_use]
    pub const fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

impl HookConfiguration for UnknownHook {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(self.payload.clone())
    }

    fn clone_box(&self) -> Box<dyn HookConfiguration> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One configured hook.
#[derive(Debug, Clone)]
pub struct HookEntry {
    id: String,
    configuration: Box<dyn HookConfiguration>,
}

impl HookEntry {
    /// Creates an entry with the given id.
    ///
    /// An empty id is replaced when the entry goes through
    /// [`ConfigurationUpdater`](super::ConfigurationUpdater).
    #[must_use]
    pub fn new(id: impl Into<String>, configuration: impl HookConfiguration) -> Self {
        Self::from_boxed(id, Box::new(configuration))
    }

    /// Creates an entry without id.
    #[must_use]
    pub fn unassigned(configuration: impl HookConfiguration) -> Self {
        Self::new(String::new(), configuration)
    }

    /// Creates an entry from an already boxed configuration.
    #[must_use]
    pub fn from_boxed(id: impl Into<String>, configuration: Box<dyn HookConfiguration>) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Returns the id (empty if not yet assigned).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the kind name of the configuration.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.configuration.kind()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn configuration(&self) -> &dyn HookConfiguration {
        self.configuration.as_ref()
    }

    /// Returns the configuration mutably.
    pub fn configuration_mut(&mut self) -> &mut dyn HookConfiguration {
        self.configuration.as_mut()
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Encodes the entry for storage.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Encode`] if the configuration cannot be encoded.
    pub fn to_stored(&self) -> Result<StoredHook, HookError> {
        let configuration = self
            .configuration
            .to_payload()
            .map_err(|source| HookError::Encode {
                kind: self.kind().to_string(),
                source,
            })?;

        Ok(StoredHook {
            id: self.id.clone(),
            name: self.kind().to_string(),
            configuration,
        })
    }

    /// Decodes a stored entry, re-deriving its kind through `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Decode`] if a known kind's payload is malformed.
    pub fn from_stored(stored: StoredHook, registry: &HookRegistry) -> Result<Self, HookError> {
        let configuration = registry.decode(&stored.name, stored.configuration)?;
        Ok(Self::from_boxed(stored.id, configuration))
    }
}

impl PartialEq for HookEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind() == other.kind()
            && self.configuration.to_payload().ok() == other.configuration.to_payload().ok()
    }
}

/// Ordered list of hook entries, either global or for one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookConfigurationSet {
    entries: Vec<HookEntry>,
}

impl HookConfigurationSet {
    /// Creates a set from entries.
    #[must_use]
    pub const fn new(entries: Vec<HookEntry>) -> Self {
        Self { entries }
    }

    /// Global entries first, then repository entries. No deduplication.
    #[must_use]
    pub fn merge(global: Self, repository: Self) -> Self {
        let mut entries = global.entries;
        entries.extend(repository.entries);
        Self { entries }
    }

    /// Returns true if the set has at least one entry.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[HookEntry] {
        &self.entries
    }

    /// Returns the entries mutably.
    pub fn entries_mut(&mut self) -> &mut [HookEntry] {
        &mut self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, HookEntry> {
        self.entries.iter()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: HookEntry) {
        self.entries.push(entry);
    }

    /// Finds the entry with the given id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&HookEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Returns the configurations of type `T`, in order.
    pub fn configurations<T: HookConfiguration>(&self) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter_map(|entry| entry.configuration().downcast_ref::<T>())
    }

    /// Encodes all entries for storage.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError::Encode`].
    pub fn to_stored(&self) -> Result<Vec<StoredHook>, HookError> {
        self.entries.iter().map(HookEntry::to_stored).collect()
    }

    /// Decodes stored entries.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError::Decode`].
    pub fn from_stored(stored: Vec<StoredHook>, registry: &HookRegistry) -> Result<Self, HookError> {
        stored
            .into_iter()
            .map(|hook| HookEntry::from_stored(hook, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl From<Vec<HookEntry>> for HookConfigurationSet {
    fn from(entries: Vec<HookEntry>) -> Self {
        Self::new(entries)
    }
}

impl<'a> IntoIterator for &'a HookConfigurationSet {
    type Item = &'a HookEntry;
    type IntoIter = std::slice::Iter<'a, HookEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for HookConfigurationSet {
    type Item = HookEntry;
    type IntoIter = std::vec::IntoIter<HookEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
