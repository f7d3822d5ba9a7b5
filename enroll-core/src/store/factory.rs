use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::slot::{AnswerSlot, FileSlot, MemorySlot, StoreError};

/// Backend-agnostic slot configuration.
///
/// `backend` must match the [`SlotFactory::backend_name`] of a registered
/// factory. `location` is passed through to that factory unchanged; its
/// meaning is entirely backend-specific.
///
/// | backend  | location examples            |
/// |----------|------------------------------|
/// | `memory` | ignored                      |
/// | `file`   | `.enroll`, `/var/lib/enroll` |
/// | `sqlite` | `enroll.db`, `:memory:`      |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method. Left blank,
    /// [`resolve_location`](Self::resolve_location) fills in the backend's
    /// default.
    #[serde(default)]
    pub location: String,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::for_backend("file")
    }
}

impl SlotConfig {
    /// `backend` at its default location.
    pub fn for_backend(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            location: Self::default_location(backend).to_string(),
        }
    }

    /// Location a built-in backend uses when none is configured.
    pub fn default_location(backend: &str) -> &'static str {
        match backend.trim().to_ascii_lowercase().as_str() {
            "sqlite" => "enroll.db",
            "memory" => "",
            _ => ".enroll",
        }
    }

    /// Replaces a blank location with the backend's default.
    pub fn resolve_location(&mut self) {
        if self.location.trim().is_empty() {
            self.location = Self::default_location(&self.backend).to_string();
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`SlotRegistry`] at startup.
#[async_trait]
pub trait SlotFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the storage and return a ready-to-use slot.
    async fn create(
        &self,
        config: &SlotConfig,
    ) -> Result<Box<dyn AnswerSlot>, StoreError>;
}

/// Factory for [`MemorySlot`]; every call yields a fresh, empty slot.
pub struct MemorySlotFactory;

#[async_trait]
impl SlotFactory for MemorySlotFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &SlotConfig,
    ) -> Result<Box<dyn AnswerSlot>, StoreError> {
        Ok(Box::new(MemorySlot::new()))
    }
}

/// Factory for [`FileSlot`]; `location` is the directory holding documents.
pub struct FileSlotFactory;

#[async_trait]
impl SlotFactory for FileSlotFactory {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn create(
        &self,
        config: &SlotConfig,
    ) -> Result<Box<dyn AnswerSlot>, StoreError> {
        if config.location.trim().is_empty() {
            return Err(StoreError::Configuration(
                "file backend needs a directory location".to_string(),
            ));
        }
        Ok(Box::new(FileSlot::new(config.location.trim())))
    }
}

/// Registry of [`SlotFactory`] instances, keyed by backend name.
pub struct SlotRegistry {
    factories: HashMap<&'static str, Box<dyn SlotFactory>>,
}

impl SlotRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the backends that ship in this crate
    /// (`memory` and `file`).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemorySlotFactory));
        registry.register(Box::new(FileSlotFactory));
        registry
    }

    /// Register a backend factory, replacing any with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn SlotFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`StoreError::Configuration`]: no factory is registered for the
    ///   requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &SlotConfig,
    ) -> Result<Box<dyn AnswerSlot>, StoreError> {
        let factory = self
            .factories
            .get(config.backend.trim().to_ascii_lowercase().as_str())
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::{SlotConfig, SlotFactory, SlotRegistry};
    use crate::store::slot::{AnswerSlot, MemorySlot, StoreError};

    // ── stub factory ─────────────────────────────────────────────────────
    /// Flips an `AtomicBool` when `create` runs so tests can prove dispatch.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SlotFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &SlotConfig,
        ) -> Result<Box<dyn AnswerSlot>, StoreError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(MemorySlot::new()))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl SlotFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &SlotConfig,
        ) -> Result<Box<dyn AnswerSlot>, StoreError> {
            Err(StoreError::Connection("intentional failure".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn SlotFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> SlotConfig {
        SlotConfig {
            backend: backend.to_string(),
            location: "x".to_string(),
        }
    }

    // ── SlotConfig ───────────────────────────────────────────────────────
    #[test]
    fn slot_config_default_is_file_in_dot_enroll() {
        let cfg = SlotConfig::default();
        assert_eq!(cfg.backend, "file");
        assert_eq!(cfg.location, ".enroll");
    }

    #[test]
    fn missing_location_resolves_per_backend() {
        let mut cfg: SlotConfig = serde_json::from_str(r#"{ "backend": "sqlite" }"#).unwrap();
        assert_eq!(cfg.location, "");

        cfg.resolve_location();
        assert_eq!(cfg.location, "enroll.db");

        let mut kept = config("sqlite");
        kept.resolve_location();
        assert_eq!(kept.location, "x");
        assert_eq!(SlotConfig::for_backend("memory").location, "");
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(SlotRegistry::new().available_backends().is_empty());
        assert!(SlotRegistry::default().available_backends().is_empty());
    }

    #[test]
    fn builtin_registry_offers_memory_and_file() {
        assert_eq!(
            SlotRegistry::with_builtin().available_backends(),
            vec!["file", "memory"]
        );
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = SlotRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_calls_matching_factory_case_insensitively() {
        let mut reg = SlotRegistry::new();
        let (factory, called) = stub_factory("sqlite");
        reg.register(factory);

        let result = reg.create(&config("SQLite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_names_requested_and_available() {
        let reg = SlotRegistry::with_builtin();

        match reg.create(&config("postgres")).await {
            Err(StoreError::Configuration(msg)) => {
                assert!(msg.contains("postgres"), "{msg}");
                assert!(msg.contains("memory"), "{msg}");
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a slot"),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let mut reg = SlotRegistry::new();
        reg.register(Box::new(FailingFactory));

        assert!(matches!(
            reg.create(&config("failing")).await,
            Err(StoreError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn file_backend_rejects_blank_location() {
        let reg = SlotRegistry::with_builtin();
        let cfg = SlotConfig {
            backend: "file".to_string(),
            location: "  ".to_string(),
        };

        assert!(matches!(
            reg.create(&cfg).await,
            Err(StoreError::Configuration(_))
        ));
    }
}
