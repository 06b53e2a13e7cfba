//! Capability registry
//!
//! Feature groups (formatters, loggers, ...) are registered per
//! [`ErrorClass`] and inherited down the class hierarchy. Every record gets a
//! table of lazy cells, one per feature key of every group resolved for its
//! class at construction; a feature is built by its factory on first access
//! and memoized for the life of the record.
//!
//! ```rust
//! use fault_core::capability::FeatureGroup;
//! use fault_core::class::{ErrorClass, BASE};
//! use fault_core::ErrorRecord;
//!
//! static TAGGED: ErrorClass = ErrorClass::derive("TaggedError", &BASE);
//!
//! TAGGED
//!     .register_group(
//!         "tags",
//!         FeatureGroup::new().with("upper", |error: &ErrorRecord| error.message().to_uppercase()),
//!     )
//!     .unwrap();
//!
//! let error = ErrorRecord::builder("disk full").class(&TAGGED).build().unwrap();
//! let upper = error.feature::<String>("tags", "upper").unwrap();
//! assert_eq!(upper.as_str(), "DISK FULL");
//! ```

use crate::class::{ClassKey, ErrorClass};
use crate::config::is_reserved_field;
use crate::error::{FaultError, FaultResult};
use crate::record::ErrorRecord;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

/// A constructed feature, shared by every caller of the same record
pub type FeatureInstance = Arc<dyn Any + Send + Sync>;

/// Builds a feature for the record it is accessed on
///
/// Factories that need to keep a handle to their record should hold a
/// [`WeakErrorRecord`](crate::record::WeakErrorRecord); a strong handle
/// stored inside the record's own feature keeps the record alive forever.
pub type FeatureFactory = Arc<dyn Fn(&ErrorRecord) -> FeatureInstance + Send + Sync>;

// ============================================================================
// FEATURE GROUPS
// ============================================================================

/// Named factories making up one capability group
#[derive(Clone, Default)]
pub struct FeatureGroup {
    factories: BTreeMap<String, FeatureFactory>,
}

impl FeatureGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed factory under `key`
    pub fn with<F, T>(mut self, key: &str, factory: F) -> Self
    where
        F: Fn(&ErrorRecord) -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let erased: FeatureFactory =
            Arc::new(move |error: &ErrorRecord| Arc::new(factory(error)) as FeatureInstance);
        self.factories.insert(key.to_string(), erased);
        self
    }

    /// Add an already type-erased factory under `key`
    pub fn with_factory(mut self, key: &str, factory: FeatureFactory) -> Self {
        self.factories.insert(key.to_string(), factory);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factory(&self, key: &str) -> Option<&FeatureFactory> {
        self.factories.get(key)
    }
}

impl std::fmt::Debug for FeatureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGroup")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Capability groups by name
pub type GroupTable = BTreeMap<String, Arc<FeatureGroup>>;

/// Table of capability groups keyed by class identity
///
/// Records consult [`CapabilityRegistry::global`] unless built with
/// [`ErrorBuilder::registry`](crate::record::ErrorBuilder::registry).
#[derive(Default)]
pub struct CapabilityRegistry {
    classes: RwLock<HashMap<ClassKey, GroupTable>>,
}

static GLOBAL_REGISTRY: OnceLock<CapabilityRegistry> = OnceLock::new();

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry consulted when records are constructed
    pub fn global() -> &'static CapabilityRegistry {
        GLOBAL_REGISTRY.get_or_init(CapabilityRegistry::new)
    }

    /// Register `group` on `class`
    ///
    /// Fails with `InvalidState` when the group name shadows a record field
    /// and with `AlreadyRegistered` when the class itself already carries a
    /// group of that name. Groups inherited from ancestors may be overridden.
    pub fn register_group(
        &self,
        class: &'static ErrorClass,
        group: &str,
        features: FeatureGroup,
    ) -> FaultResult<()> {
        if group.trim().is_empty() {
            return Err(FaultError::invalid_argument(
                "capability group name must not be empty",
            ));
        }
        if is_reserved_field(group) {
            return Err(FaultError::invalid_state(&format!(
                "capability group '{}' collides with a record field",
                group
            )));
        }

        let mut classes = self
            .classes
            .write()
            .map_err(|_| FaultError::poisoned("capability registry"))?;
        let groups = classes.entry(class.key()).or_default();
        if groups.contains_key(group) {
            return Err(FaultError::already_registered(class.name(), group));
        }
        groups.insert(group.to_string(), Arc::new(features));
        Ok(())
    }

    /// Groups visible to `class`, nearest registration winning
    pub fn resolve(&self, class: &'static ErrorClass) -> FaultResult<GroupTable> {
        let classes = self
            .classes
            .read()
            .map_err(|_| FaultError::poisoned("capability registry"))?;

        let mut resolved = GroupTable::new();
        for ancestor in class.lineage() {
            if let Some(groups) = classes.get(&ancestor.key()) {
                for (name, group) in groups {
                    resolved
                        .entry(name.clone())
                        .or_insert_with(|| Arc::clone(group));
                }
            }
        }
        Ok(resolved)
    }

    /// Group names registered directly on `class`
    pub fn registered_on(&self, class: &'static ErrorClass) -> FaultResult<Vec<String>> {
        let classes = self
            .classes
            .read()
            .map_err(|_| FaultError::poisoned("capability registry"))?;
        Ok(classes
            .get(&class.key())
            .map(|groups| groups.keys().cloned().collect())
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let classes = self.classes.read().map(|classes| classes.len()).ok();
        f.debug_struct("CapabilityRegistry")
            .field("classes", &classes)
            .finish()
    }
}

impl ErrorClass {
    /// Register a capability group on this class in the global registry
    pub fn register_group(
        &'static self,
        group: &str,
        features: FeatureGroup,
    ) -> FaultResult<&'static ErrorClass> {
        CapabilityRegistry::global().register_group(self, group, features)?;
        Ok(self)
    }
}

// ============================================================================
// PER-RECORD TABLE
// ============================================================================

pub(crate) struct CapabilitySlot {
    group: Arc<FeatureGroup>,
    cells: BTreeMap<String, OnceLock<FeatureInstance>>,
}

/// Lazy feature cells owned by one record
#[derive(Default)]
pub(crate) struct CapabilityTable {
    slots: BTreeMap<String, CapabilitySlot>,
}

impl CapabilityTable {
    /// Snapshot the groups `registry` resolves for `class` into fresh cells
    ///
    /// Reserved names never reach a registry, so every resolved group can
    /// become a slot.
    pub(crate) fn for_class(
        registry: &CapabilityRegistry,
        class: &'static ErrorClass,
    ) -> FaultResult<Self> {
        let mut slots = BTreeMap::new();
        for (name, group) in registry.resolve(class)? {
            let cells = group
                .keys()
                .map(|key| (key.to_string(), OnceLock::new()))
                .collect();
            slots.insert(name, CapabilitySlot { group, cells });
        }
        Ok(Self { slots })
    }

    pub(crate) fn slot(&self, group: &str) -> Option<&CapabilitySlot> {
        self.slots.get(group)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

/// One capability group as seen from a specific record
pub struct CapabilityView<'a> {
    record: &'a ErrorRecord,
    group: &'a str,
    slot: &'a CapabilitySlot,
}

impl<'a> CapabilityView<'a> {
    pub(crate) fn new(record: &'a ErrorRecord, group: &'a str, slot: &'a CapabilitySlot) -> Self {
        Self {
            record,
            group,
            slot,
        }
    }

    pub fn group(&self) -> &'a str {
        self.group
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        let slot = self.slot;
        slot.cells.keys().map(String::as_str)
    }

    /// Whether `key` has already been built for this record
    pub fn is_instantiated(&self, key: &str) -> bool {
        self.slot
            .cells
            .get(key)
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    /// The feature under `key`, built on first access
    pub fn get(&self, key: &str) -> FaultResult<FeatureInstance> {
        let feature_path = format!("{}.{}", self.group, key);
        let (cell, factory) = match (self.slot.cells.get(key), self.slot.group.factory(key)) {
            (Some(cell), Some(factory)) => (cell, factory),
            _ => return Err(FaultError::not_found("Feature", &feature_path)),
        };
        Ok(Arc::clone(cell.get_or_init(|| (**factory)(self.record))))
    }

    /// The feature under `key`, downcast to its concrete type
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> FaultResult<Arc<T>> {
        self.get(key)?.downcast::<T>().map_err(|_| {
            FaultError::invalid_state(&format!(
                "feature '{}.{}' is not a {}",
                self.group,
                key,
                std::any::type_name::<T>()
            ))
        })
    }
}

impl std::fmt::Debug for CapabilityView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityView")
            .field("group", &self.group)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ErrorRecord {
    /// View of a capability group resolved for this record's class
    pub fn capability<'a>(&'a self, group: &'a str) -> FaultResult<CapabilityView<'a>> {
        let slot = self
            .capabilities()
            .slot(group)
            .ok_or_else(|| FaultError::not_found("Capability group", group))?;
        Ok(CapabilityView::new(self, group, slot))
    }

    /// Shorthand for `capability(group)?.get_as::<T>(key)`
    pub fn feature<T: Any + Send + Sync>(&self, group: &str, key: &str) -> FaultResult<Arc<T>> {
        self.capability(group)?.get_as::<T>(key)
    }

    /// Capability groups available on this record
    pub fn capability_names(&self) -> Vec<&str> {
        self.capabilities().names().collect()
    }
}
