//! TracehouseContext - Central context object for the ApiThing pattern
//!
//! The context holds the configuration, the storage engine to open shards
//! with, and the initialized service instance once a workspace is opened.
//! Operations receive the context mutably and manage its lifecycle: a context
//! starts uninitialized, [`OpenWorkspace`](crate::api::OpenWorkspace) turns it
//! into a live service, and query operations fail cleanly before that point.

use crate::config::TracehouseConfig;
use crate::engine::StorageEngine;
use crate::error::TracehouseError;
use crate::tracehouse::TracehouseImpl;

/// Central state holder for all Tracehouse API operations
pub struct TracehouseContext<E: StorageEngine> {
    config: TracehouseConfig,
    engine: Option<E>,
    instance: Option<TracehouseImpl<E>>,
}

impl<E: StorageEngine> TracehouseContext<E> {
    /// Create a context with default configuration
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, TracehouseConfig::default())
    }

    /// Create a context with a specific configuration
    pub fn with_config(engine: E, config: TracehouseConfig) -> Self {
        Self {
            config,
            engine: Some(engine),
            instance: None,
        }
    }

    /// Whether a workspace has been opened
    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// The current configuration
    pub fn get_config(&self) -> &TracehouseConfig {
        &self.config
    }

    /// Replace the configuration before the workspace is opened
    pub fn update_config(&mut self, config: TracehouseConfig) -> Result<(), TracehouseError> {
        if self.is_initialized() {
            return Err(TracehouseError::invalid_input(
                "context",
                "workspace is already open",
                "Create a fresh context to change the configuration",
            ));
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Open the workspace, consuming the held engine
    pub(crate) fn initialize(&mut self) -> Result<(), TracehouseError> {
        let engine = self.engine.take().ok_or_else(|| {
            TracehouseError::invalid_input(
                "context",
                "workspace is already open",
                "Open a workspace at most once per context",
            )
        })?;
        self.instance = Some(TracehouseImpl::new(self.config.clone(), engine)?);
        Ok(())
    }

    /// The live service instance, if the workspace has been opened
    pub(crate) fn instance(&self) -> Result<&TracehouseImpl<E>, TracehouseError> {
        self.instance.as_ref().ok_or_else(|| {
            TracehouseError::invalid_input(
                "context",
                "workspace is not open",
                "Execute OpenWorkspace before running queries",
            )
        })
    }
}
