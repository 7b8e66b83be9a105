//! Workbench driver
//!
//! Plans two test cases per type (current and historical retrieval), runs
//! them on a worker pool, isolates fatal errors per test case and turns the
//! recorder's contents into a [`WorkbenchReport`].
//!
//! Test cases are planned in catalog order, current variant first. That
//! order is kept in the report whatever order the workers finished in.

use chrono::Utc;
use conform_core::{RepositoryConnector, Timestamp, TypeCatalog, TypeCategory, TypeDescriptor};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assertion::TestCaseId;
use crate::config::WorkbenchConfig;
use crate::context::WorkContext;
use crate::error::{HarnessError, HarnessResult};
use crate::profile::ProfileAggregator;
use crate::recorder::{AssertionRecorder, RunFailure};
use crate::report::{RunSettings, WorkbenchReport};
use crate::testcase::{
    Entities, Relationships, RetrievalTestCase, TestCase, TestCaseState, TestCaseSummary,
};

/// Runs every test case against one connector
pub struct Workbench {
    context: WorkContext,
    catalog: Arc<dyn TypeCatalog>,
    aggregator: ProfileAggregator,
    keep_assertions: bool,
}

impl Workbench {
    /// Workbench over `context`, exercising the types listed by `catalog`
    pub fn new(context: WorkContext, catalog: Arc<dyn TypeCatalog>) -> Self {
        Workbench {
            context,
            catalog,
            aggregator: ProfileAggregator::default(),
            keep_assertions: false,
        }
    }

    /// Workbench for `connector` starting now.
    ///
    /// Types listed in `config` take precedence over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn for_connector(
        config: WorkbenchConfig,
        connector: Arc<dyn RepositoryConnector>,
        catalog: Arc<dyn TypeCatalog>,
    ) -> HarnessResult<Self> {
        let catalog: Arc<dyn TypeCatalog> = match config.type_catalog() {
            Some(configured) => Arc::new(configured),
            None => catalog,
        };
        let context = WorkContext::new(config, connector)?;
        Ok(Self::new(context, catalog))
    }

    /// Report on a custom set of profiles
    pub fn with_aggregator(mut self, aggregator: ProfileAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Keep every raw assertion in the report
    pub fn keep_assertions(mut self, keep: bool) -> Self {
        self.keep_assertions = keep;
        self
    }

    /// Run context
    pub fn context(&self) -> &WorkContext {
        &self.context
    }

    /// Test cases for every catalog type, in run order.
    ///
    /// Types listed twice (same guid) are planned once.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Catalog`] if the catalog cannot be listed.
    pub fn plan(&self) -> HarnessResult<Vec<Box<dyn TestCase>>> {
        let types = self
            .catalog
            .type_descriptors()
            .map_err(HarnessError::Catalog)?;

        let as_of_time = self.context.as_of_time();
        let mut seen = HashSet::new();
        let mut cases: Vec<Box<dyn TestCase>> = Vec::with_capacity(types.len() * 2);
        for type_def in types {
            if !seen.insert(type_def.guid.clone()) {
                debug!(type_guid = %type_def.guid, "Skipping duplicate type");
                continue;
            }
            cases.extend(Self::cases_for(type_def, as_of_time));
        }
        Ok(cases)
    }

    fn cases_for(type_def: TypeDescriptor, as_of_time: Timestamp) -> [Box<dyn TestCase>; 2] {
        match type_def.category {
            TypeCategory::Entity => [
                Box::new(RetrievalTestCase::<Entities>::current(type_def.clone())),
                Box::new(RetrievalTestCase::<Entities>::historical(type_def, as_of_time)),
            ],
            TypeCategory::Relationship => [
                Box::new(RetrievalTestCase::<Relationships>::current(type_def.clone())),
                Box::new(RetrievalTestCase::<Relationships>::historical(type_def, as_of_time)),
            ],
        }
    }

    /// Plan, run and report with a fresh recorder.
    ///
    /// # Errors
    ///
    /// Only errors that stop the whole run: an unreadable catalog or a worker
    /// pool that cannot start. Fatal test case errors end up in
    /// [`WorkbenchReport::failures`].
    pub fn run(&self) -> HarnessResult<WorkbenchReport> {
        self.run_with(&AssertionRecorder::new())
    }

    /// Plan, run and report, recording into `recorder`.
    ///
    /// The report covers everything `recorder` holds once the run is over.
    pub fn run_with(&self, recorder: &AssertionRecorder) -> HarnessResult<WorkbenchReport> {
        let started_at = Utc::now();
        let mut cases = self.plan()?;
        let workers = self.context.config().workers;
        let repository = self.context.connector().repository_name().to_string();

        info!(
            repository = %repository,
            test_cases = cases.len(),
            workers,
            "Starting workbench run"
        );

        if workers > 1 && cases.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("conform-worker-{}", i))
                .build()
                .map_err(|e| HarnessError::Pool {
                    reason: e.to_string(),
                })?;
            pool.install(|| {
                cases
                    .par_iter_mut()
                    .for_each(|case| self.execute(case.as_mut(), recorder))
            });
        } else {
            for case in cases.iter_mut() {
                self.execute(case.as_mut(), recorder);
            }
        }

        let report = self.report(&cases, recorder, repository, started_at);
        info!(
            repository = %report.repository,
            assertions = report.totals().total,
            failed = report.totals().failed,
            run_failures = report.failures.len(),
            "Workbench run finished"
        );
        Ok(report)
    }

    fn execute(&self, case: &mut dyn TestCase, recorder: &AssertionRecorder) {
        if let Err(err) = case.run(&self.context, recorder) {
            warn!(test_case = %case.id(), error = %err, "Test case aborted");
            recorder.record_failure(RunFailure::new(
                case.id(),
                &case.type_descriptor().name,
                &err,
            ));
        }
    }

    fn report(
        &self,
        cases: &[Box<dyn TestCase>],
        recorder: &AssertionRecorder,
        repository: String,
        started_at: chrono::DateTime<Utc>,
    ) -> WorkbenchReport {
        let order: HashMap<&TestCaseId, usize> = cases
            .iter()
            .enumerate()
            .map(|(i, case)| (case.id(), i))
            .collect();
        let rank = |id: &TestCaseId| order.get(id).copied().unwrap_or(usize::MAX);

        // Stable sorts keep each test case's own call order.
        let mut assertions = recorder.assertions();
        assertions.sort_by_key(|a| rank(&a.test_case_id));
        let mut failures = recorder.failures();
        failures.sort_by_key(|f| rank(&f.test_case_id));

        let mut profiles = self.aggregator.aggregate_assertions(&assertions);
        for case in cases.iter().filter(|c| c.state() == TestCaseState::Aborted) {
            let touched = case.profiles();
            for profile in profiles.iter_mut().filter(|p| touched.contains(&p.profile)) {
                profile.aborted_test_cases += 1;
            }
        }
        let test_cases = cases
            .iter()
            .map(|case| TestCaseSummary::collect(case.as_ref(), recorder))
            .collect();

        WorkbenchReport {
            run_id: Uuid::new_v4().to_string(),
            repository,
            started_at,
            finished_at: Utc::now(),
            settings: RunSettings::from_context(&self.context),
            profiles,
            test_cases,
            failures,
            assertions: if self.keep_assertions {
                assertions
            } else {
                Vec::new()
            },
        }
    }
}
