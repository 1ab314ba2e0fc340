//! Application state for the leave and payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::directory::{Clock, InMemoryAttendance, InMemoryDirectory};
use crate::engine::HrEngine;
use crate::store::Store;

/// Shared application state.
///
/// Holds the engine plus the in-memory directory and attendance ledger that
/// stand in for the back office's own services.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<HrEngine>,
    directory: Arc<InMemoryDirectory>,
    attendance: Arc<InMemoryAttendance>,
}

impl AppState {
    /// Creates the state, wiring the engine to the given collaborators.
    pub fn new(
        config: EngineConfig,
        directory: Arc<InMemoryDirectory>,
        attendance: Arc<InMemoryAttendance>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_store(config, Store::new(), directory, attendance, clock)
    }

    /// Creates the state over an existing store.
    pub fn with_store(
        config: EngineConfig,
        store: Store,
        directory: Arc<InMemoryDirectory>,
        attendance: Arc<InMemoryAttendance>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = HrEngine::with_store(
            config,
            store,
            directory.clone(),
            attendance.clone(),
            clock,
        );
        Self {
            engine: Arc::new(engine),
            directory,
            attendance,
        }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &HrEngine {
        &self.engine
    }

    /// Returns the employee directory.
    pub fn directory(&self) -> &InMemoryDirectory {
        &self.directory
    }

    /// Returns the attendance ledger.
    pub fn attendance(&self) -> &InMemoryAttendance {
        &self.attendance
    }
}
