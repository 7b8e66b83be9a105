//! Work context for one run
//!
//! Built once when the workbench starts and shared read-only by every test
//! case. Results do not live here; they go to the [`AssertionRecorder`]
//! handle passed alongside.
//!
//! [`AssertionRecorder`]: crate::recorder::AssertionRecorder

use conform_core::{RepositoryConnector, Timestamp};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WorkbenchConfig;
use crate::error::HarnessResult;

/// Read-only state shared by the test cases of one run
#[derive(Clone)]
pub struct WorkContext {
    config: WorkbenchConfig,
    connector: Arc<dyn RepositoryConnector>,
    started: Timestamp,
    as_of_time: Timestamp,
}

impl WorkContext {
    /// Context for a run starting now
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(
        config: WorkbenchConfig,
        connector: Arc<dyn RepositoryConnector>,
    ) -> HarnessResult<Self> {
        Self::starting_at(config, connector, Timestamp::now())
    }

    /// Context for a run whose start time is fixed by the caller
    pub fn starting_at(
        config: WorkbenchConfig,
        connector: Arc<dyn RepositoryConnector>,
        started: Timestamp,
    ) -> HarnessResult<Self> {
        config.validate()?;
        let as_of_time = config.as_of_time(started);
        Ok(WorkContext {
            config,
            connector,
            started,
            as_of_time,
        })
    }

    /// Connector under test
    pub fn connector(&self) -> &Arc<dyn RepositoryConnector> {
        &self.connector
    }

    /// Run configuration
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Calling identity
    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Instances sampled per type
    pub fn instances_per_type(&self) -> usize {
        self.config.instances_per_type
    }

    /// Page size of history requests
    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }

    /// Per-call timeout
    pub fn call_timeout(&self) -> Option<Duration> {
        self.config.call_timeout()
    }

    /// When the run started
    pub fn started(&self) -> Timestamp {
        self.started
    }

    /// Point in time historical test cases read at
    pub fn as_of_time(&self) -> Timestamp {
        self.as_of_time
    }
}

impl fmt::Debug for WorkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkContext")
            .field("repository", &self.connector.repository_name())
            .field("config", &self.config)
            .field("started", &self.started)
            .field("as_of_time", &self.as_of_time)
            .finish()
    }
}
