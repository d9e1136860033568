//! Plugin-based registrar registry
//!
//! The registry allows registrar backends to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the daemon.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ncdns_core::registry::RegistrarRegistry;
//! use ncdns_core::config::RegistrarConfig;
//!
//! // Create a registry
//! let registry = RegistrarRegistry::new();
//!
//! // Register registrars
//! ncdns_registrar_namecheap::register(&registry);
//!
//! // Create a repository from config
//! let config = RegistrarConfig::Namecheap { ... };
//! let repository = registry.create_repository(&config)?;
//! ```

use crate::config::RegistrarConfig;
use crate::error::{Error, Result};
use crate::traits::{RecordSetRepository, RecordSetRepositoryFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry for plugin-based repository creation
///
/// The registry maintains a map of registrar type names to factory objects,
/// allowing dynamic instantiation of repositories based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct RegistrarRegistry {
    /// Registered repository factories
    registrars: RwLock<HashMap<String, Box<dyn RecordSetRepositoryFactory>>>,
}

impl RegistrarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository factory
    ///
    /// # Parameters
    ///
    /// - `name`: Registrar type name (e.g., "namecheap")
    /// - `factory`: Factory object for creating repository instances
    pub fn register_registrar(
        &self,
        name: impl Into<String>,
        factory: Box<dyn RecordSetRepositoryFactory>,
    ) {
        let name = name.into();
        let mut registrars = self
            .registrars
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registrars.insert(name, factory);
    }

    /// Create a repository from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordSetRepository>)`: Created repository instance
    /// - `Err(Error)`: If the registrar type is not registered or creation fails
    pub fn create_repository(
        &self,
        config: &RegistrarConfig,
    ) -> Result<Box<dyn RecordSetRepository>> {
        let registrar_type = config.type_name();
        let registrars = self
            .registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = registrars
            .get(registrar_type)
            .ok_or_else(|| Error::config(format!("Unknown registrar type: {}", registrar_type)))?;

        factory.create(config)
    }

    /// List all registered registrar types
    pub fn list_registrars(&self) -> Vec<String> {
        let registrars = self
            .registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        registrars.keys().cloned().collect()
    }

    /// Check if a registrar type is registered
    pub fn has_registrar(&self, name: &str) -> bool {
        let registrars = self
            .registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        registrars.contains_key(name)
    }
}
