//! Generic retrieval test case
//!
//! One implementation serves all four variants:
//!
//! | family        | mode       | steps                                  |
//! |---------------|------------|----------------------------------------|
//! | entity        | current    | discover, exists, summary, detail      |
//! | entity        | historical | discover as-of, detail as-of, history  |
//! | relationship  | current    | discover, exists, detail               |
//! | relationship  | historical | discover as-of, detail as-of, history  |
//!
//! ## Per-call policy
//!
//! - `Unsupported`: record NOT_SUPPORTED, stop calling that operation for the
//!   rest of the test case (remaining identities get a skipped NOT_SUPPORTED
//!   assertion each), carry on with the next step
//! - `NotFound`, `Ok(None)`, or a result contradicting an earlier step:
//!   record FAILED, carry on with the next identity
//! - anything else (including a timeout): abort the test case with full
//!   call context, no assertion for that call

use conform_core::{
    history_is_backwards, ConnectorResult, FindRequest, Guid, HistoryRequest, InstanceSnapshot,
    Operation, RepositoryConnector, Timestamp, TypeDescriptor,
};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

use super::family::InstanceFamily;
use super::invoke::invoke;
use super::{TestCase, TestCaseState};
use crate::assertion::{Assertion, Outcome, ProfileId, TestCaseId};
use crate::context::WorkContext;
use crate::error::{CallContext, HarnessError, HarnessResult};
use crate::recorder::AssertionRecorder;

/// Temporal mode of a retrieval test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Read current state
    Current,
    /// Read state as of a point in time, then full version history
    Historical {
        /// Point in time of the as-of reads
        as_of_time: Timestamp,
    },
}

impl RetrievalMode {
    fn as_of_time(&self) -> Option<Timestamp> {
        match self {
            RetrievalMode::Current => None,
            RetrievalMode::Historical { as_of_time } => Some(*as_of_time),
        }
    }
}

/// What one contract call is, for the assertion and for diagnostics
struct Call {
    profile: ProfileId,
    description: String,
    parameters: String,
    context: CallContext,
}

/// How one call ended, when it did not abort the test case
enum Attempt<T> {
    Passed(T),
    Failed(Option<T>),
    NotSupported,
}

/// A step repeated for every discovered identity
struct PerInstance {
    profile: ProfileId,
    operation: Operation,
    action: &'static str,
    as_of_time: Option<Timestamp>,
}

/// Retrieval test case for one type, generic over the instance family
pub struct RetrievalTestCase<F: InstanceFamily> {
    id: TestCaseId,
    type_def: TypeDescriptor,
    mode: RetrievalMode,
    state: TestCaseState,
    discovered: usize,
    family: PhantomData<fn() -> F>,
}

impl<F: InstanceFamily> RetrievalTestCase<F> {
    /// Current-state variant for `type_def`
    pub fn current(type_def: TypeDescriptor) -> Self {
        Self::new(type_def, RetrievalMode::Current)
    }

    /// Historical variant for `type_def`, reading as of `as_of_time`
    pub fn historical(type_def: TypeDescriptor, as_of_time: Timestamp) -> Self {
        Self::new(type_def, RetrievalMode::Historical { as_of_time })
    }

    /// Test case for `type_def` in `mode`
    pub fn new(type_def: TypeDescriptor, mode: RetrievalMode) -> Self {
        let id = TestCaseId::new(Self::variant_name(mode), &type_def);
        RetrievalTestCase {
            id,
            type_def,
            mode,
            state: TestCaseState::Created,
            discovered: 0,
            family: PhantomData,
        }
    }

    /// Temporal mode
    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    fn variant_name(mode: RetrievalMode) -> &'static str {
        match (F::CATEGORY.label(), mode) {
            ("entity", RetrievalMode::Current) => "entity-retrieval",
            ("entity", RetrievalMode::Historical { .. }) => "entity-history-retrieval",
            (_, RetrievalMode::Current) => "relationship-retrieval",
            (_, RetrievalMode::Historical { .. }) => "relationship-history-retrieval",
        }
    }

    fn execute(&mut self, ctx: &WorkContext, recorder: &AssertionRecorder) -> HarnessResult<()> {
        let guids = match self.discover(ctx, recorder)? {
            Some(guids) => guids,
            None => return Ok(()),
        };

        match self.mode {
            RetrievalMode::Current => {
                self.verify_existence(ctx, recorder, &guids)?;
                if let Some(operation) = F::SUMMARY {
                    self.fetch_summaries(ctx, recorder, &guids, operation)?;
                }
                self.fetch_details(ctx, recorder, &guids, F::RETRIEVAL_PROFILE, None)?;
            }
            RetrievalMode::Historical { as_of_time } => {
                self.fetch_details(
                    ctx,
                    recorder,
                    &guids,
                    F::HISTORY_RETRIEVAL_PROFILE,
                    Some(as_of_time),
                )?;
                self.fetch_histories(ctx, recorder, &guids)?;
            }
        }
        Ok(())
    }

    /// Step 1: find up to `instances_per_type` instances of the type.
    ///
    /// Returns `None` when the connector does not support discovery.
    fn discover(
        &mut self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
    ) -> HarnessResult<Option<BTreeSet<Guid>>> {
        let limit = ctx.instances_per_type();
        let as_of_time = self.mode.as_of_time();
        let mut request = FindRequest::of_type(self.type_def.guid.clone(), limit);
        if let Some(as_of) = as_of_time {
            request = request.as_of(as_of);
        }
        let profile = match self.mode {
            RetrievalMode::Current => F::SEARCH_PROFILE,
            RetrievalMode::Historical { .. } => F::HISTORY_SEARCH_PROFILE,
        };

        let call = Call {
            profile,
            description: self.describe("discover instances of"),
            parameters: format!(
                "typeGUID={} limit={}{}",
                self.type_def.guid,
                limit,
                as_of_suffix(as_of_time)
            ),
            context: CallContext::new(F::FIND, &self.type_def).with_as_of(as_of_time),
        };
        let user_id = ctx.user_id().to_string();
        let attempt = self.attempt(
            ctx,
            recorder,
            call,
            move |repo: &dyn RepositoryConnector| F::find(repo, &user_id, &request),
            |found: &Vec<InstanceSnapshot>| self.check_discovered(found, limit, as_of_time),
        )?;

        let found = match attempt {
            Attempt::Passed(found) | Attempt::Failed(Some(found)) => found,
            Attempt::Failed(None) => Vec::new(),
            Attempt::NotSupported => {
                info!(test_case = %self.id, "Discovery not supported, nothing further to test");
                return Ok(None);
            }
        };

        let guids: BTreeSet<Guid> = found.into_iter().map(|snapshot| snapshot.guid).collect();
        self.discovered = guids.len();
        debug!(test_case = %self.id, discovered = guids.len(), "Discovered instances");
        Ok(Some(guids))
    }

    /// Step 2: probe every discovered identity.
    fn verify_existence(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        guids: &BTreeSet<Guid>,
    ) -> HarnessResult<()> {
        let step = PerInstance {
            profile: F::RETRIEVAL_PROFILE,
            operation: F::EXISTS,
            action: "probe existence of",
            as_of_time: None,
        };
        self.per_instance(
            ctx,
            recorder,
            guids,
            step,
            |user_id, guid| {
                move |repo: &dyn RepositoryConnector| F::exists(repo, &user_id, &guid)
            },
            |guid, found: &Option<InstanceSnapshot>| match found {
                Some(snapshot) => self.check_identity(guid, snapshot),
                None => Err(format!("existence probe found no instance {}", guid)),
            },
        )
    }

    /// Step 3: minimal-detail read of every discovered identity.
    fn fetch_summaries(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        guids: &BTreeSet<Guid>,
        operation: Operation,
    ) -> HarnessResult<()> {
        let step = PerInstance {
            profile: F::RETRIEVAL_PROFILE,
            operation,
            action: "retrieve summary of",
            as_of_time: None,
        };
        self.per_instance(
            ctx,
            recorder,
            guids,
            step,
            |user_id, guid| {
                move |repo: &dyn RepositoryConnector| F::summary(repo, &user_id, &guid)
            },
            |guid, snapshot: &InstanceSnapshot| self.check_identity(guid, snapshot),
        )
    }

    /// Step 4: full read of every discovered identity, as of a time if given.
    fn fetch_details(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        guids: &BTreeSet<Guid>,
        profile: ProfileId,
        as_of_time: Option<Timestamp>,
    ) -> HarnessResult<()> {
        let step = PerInstance {
            profile,
            operation: F::DETAIL,
            action: "retrieve detail of",
            as_of_time,
        };
        self.per_instance(
            ctx,
            recorder,
            guids,
            step,
            |user_id, guid| {
                move |repo: &dyn RepositoryConnector| F::detail(repo, &user_id, &guid, as_of_time)
            },
            |guid, snapshot: &InstanceSnapshot| {
                self.check_identity(guid, snapshot)?;
                match as_of_time {
                    Some(as_of) => check_as_of(snapshot, as_of),
                    None => Ok(()),
                }
            },
        )
    }

    /// Step 5: first page of the full history, most recent version first.
    fn fetch_histories(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        guids: &BTreeSet<Guid>,
    ) -> HarnessResult<()> {
        let page_size = ctx.max_page_size();
        let request = HistoryRequest::full(page_size);
        let step = PerInstance {
            profile: F::HISTORY_RETRIEVAL_PROFILE,
            operation: F::HISTORY,
            action: "retrieve history of",
            as_of_time: None,
        };
        self.per_instance(
            ctx,
            recorder,
            guids,
            step,
            |user_id, guid| {
                let request = request.clone();
                move |repo: &dyn RepositoryConnector| F::history(repo, &user_id, &guid, &request)
            },
            |guid, history: &Vec<InstanceSnapshot>| self.check_history(guid, history, page_size),
        )
    }

    /// Run one step for every identity, stopping early if the operation
    /// turns out to be unsupported.
    fn per_instance<T, M, C, V>(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        guids: &BTreeSet<Guid>,
        step: PerInstance,
        make_call: M,
        verify: V,
    ) -> HarnessResult<()>
    where
        T: Send + 'static,
        M: Fn(String, Guid) -> C,
        C: FnOnce(&dyn RepositoryConnector) -> ConnectorResult<T> + Send + 'static,
        V: Fn(&Guid, &T) -> Result<(), String>,
    {
        let mut declined: Option<String> = None;
        for guid in guids {
            let call = Call {
                profile: step.profile,
                description: self.describe(step.action),
                parameters: format!("guid={}{}", guid, as_of_suffix(step.as_of_time)),
                context: CallContext::new(step.operation, &self.type_def)
                    .with_guid(guid)
                    .with_as_of(step.as_of_time),
            };
            if let Some(reason) = &declined {
                self.record(recorder, call, Outcome::NotSupported, 0, Some(reason.clone()), true);
                continue;
            }
            let attempt = self.attempt(
                ctx,
                recorder,
                call,
                make_call(ctx.user_id().to_string(), guid.clone()),
                |value| verify(guid, value),
            )?;
            if let Attempt::NotSupported = attempt {
                info!(
                    test_case = %self.id,
                    operation = %step.operation,
                    "Operation not supported, not calling it for remaining instances"
                );
                declined = Some(format!(
                    "not called: {} already reported unsupported",
                    step.operation
                ));
            }
        }
        Ok(())
    }

    /// Make one timed call and record its assertion.
    fn attempt<T, C, V>(
        &self,
        ctx: &WorkContext,
        recorder: &AssertionRecorder,
        call: Call,
        invoke_call: C,
        verify: V,
    ) -> HarnessResult<Attempt<T>>
    where
        T: Send + 'static,
        C: FnOnce(&dyn RepositoryConnector) -> ConnectorResult<T> + Send + 'static,
        V: FnOnce(&T) -> Result<(), String>,
    {
        let timed = match invoke(ctx.connector(), ctx.call_timeout(), invoke_call)? {
            Some(timed) => timed,
            None => {
                warn!(test_case = %self.id, call = %call.context, "Contract call timed out");
                return Err(HarnessError::Timeout {
                    context: call.context,
                    timeout_ms: ctx.config().call_timeout_ms.unwrap_or_default(),
                });
            }
        };

        let (outcome, detail, attempt) = match timed.result {
            Ok(value) => match verify(&value) {
                Ok(()) => (Outcome::Passed, None, Attempt::Passed(value)),
                Err(reason) => (Outcome::Failed, Some(reason), Attempt::Failed(Some(value))),
            },
            Err(err) if err.is_unsupported() => {
                (Outcome::NotSupported, Some(err.to_string()), Attempt::NotSupported)
            }
            Err(err) if err.is_not_found() => (
                Outcome::Failed,
                Some(format!("expected instance is absent: {}", err)),
                Attempt::Failed(None),
            ),
            Err(source) => {
                warn!(test_case = %self.id, call = %call.context, error = %source, "Contract call failed");
                return Err(HarnessError::Operation {
                    context: call.context,
                    source,
                });
            }
        };

        if outcome == Outcome::Failed {
            warn!(
                test_case = %self.id,
                call = %call.context,
                detail = detail.as_deref().unwrap_or_default(),
                "Consistency violation"
            );
        }
        self.record(
            recorder,
            call,
            outcome,
            timed.elapsed.as_micros() as u64,
            detail,
            false,
        );
        Ok(attempt)
    }

    fn record(
        &self,
        recorder: &AssertionRecorder,
        call: Call,
        outcome: Outcome,
        elapsed_micros: u64,
        detail: Option<String>,
        skipped: bool,
    ) {
        debug!(
            test_case = %self.id,
            operation = %call.context.operation,
            outcome = %outcome,
            elapsed_us = elapsed_micros,
            skipped,
            "Recorded assertion"
        );
        recorder.record(Assertion {
            test_case_id: self.id.clone(),
            description: call.description,
            profile: call.profile,
            parameters: call.parameters,
            operation: call.context.operation,
            category: F::CATEGORY,
            elapsed_micros,
            outcome,
            detail,
            skipped,
        });
    }

    fn describe(&self, action: &str) -> String {
        format!("{} {} {}", action, self.type_def.name, F::CATEGORY)
    }

    fn check_discovered(
        &self,
        found: &[InstanceSnapshot],
        limit: usize,
        as_of_time: Option<Timestamp>,
    ) -> Result<(), String> {
        if found.len() > limit {
            return Err(format!(
                "search returned {} instances, more than the limit of {}",
                found.len(),
                limit
            ));
        }
        for snapshot in found {
            self.check_type(snapshot)?;
            if let Some(as_of) = as_of_time {
                if !snapshot.existed_at(as_of) {
                    return Err(format!(
                        "search as of {} returned instance {} created later",
                        as_of.to_rfc3339(),
                        snapshot.guid
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_identity(&self, guid: &Guid, snapshot: &InstanceSnapshot) -> Result<(), String> {
        if &snapshot.guid != guid {
            return Err(format!(
                "requested instance {} but received {}",
                guid, snapshot.guid
            ));
        }
        self.check_type(snapshot)
    }

    fn check_type(&self, snapshot: &InstanceSnapshot) -> Result<(), String> {
        if snapshot.category != F::CATEGORY || snapshot.type_guid != self.type_def.guid {
            return Err(format!(
                "instance {} is a {} of type {}, expected a {} of type {}",
                snapshot.guid,
                snapshot.category,
                snapshot.type_guid,
                F::CATEGORY,
                self.type_def.guid
            ));
        }
        Ok(())
    }

    fn check_history(
        &self,
        guid: &Guid,
        history: &[InstanceSnapshot],
        page_size: usize,
    ) -> Result<(), String> {
        if history.is_empty() {
            return Err(format!("history of {} is empty", guid));
        }
        if history.len() > page_size {
            return Err(format!(
                "history page holds {} versions, more than the page size of {}",
                history.len(),
                page_size
            ));
        }
        for snapshot in history {
            self.check_identity(guid, snapshot)?;
        }
        if !history_is_backwards(history) {
            return Err(format!(
                "history of {} is not ordered most recent first",
                guid
            ));
        }
        Ok(())
    }
}

fn check_as_of(snapshot: &InstanceSnapshot, as_of: Timestamp) -> Result<(), String> {
    if !snapshot.existed_at(as_of) {
        return Err(format!(
            "read as of {} returned instance {} created at {}",
            as_of.to_rfc3339(),
            snapshot.guid,
            snapshot.create_time.to_rfc3339()
        ));
    }
    if snapshot.update_time.is_after(as_of) {
        return Err(format!(
            "read as of {} returned version {} written at {}",
            as_of.to_rfc3339(),
            snapshot.version,
            snapshot.update_time.to_rfc3339()
        ));
    }
    Ok(())
}

fn as_of_suffix(as_of_time: Option<Timestamp>) -> String {
    match as_of_time {
        Some(as_of) => format!(" asOfTime={}", as_of.to_rfc3339()),
        None => String::new(),
    }
}

impl<F: InstanceFamily> TestCase for RetrievalTestCase<F> {
    fn id(&self) -> &TestCaseId {
        &self.id
    }

    fn variant(&self) -> &'static str {
        Self::variant_name(self.mode)
    }

    fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_def
    }

    fn state(&self) -> TestCaseState {
        self.state
    }

    fn discovered(&self) -> usize {
        self.discovered
    }

    fn profiles(&self) -> [ProfileId; 2] {
        match self.mode {
            RetrievalMode::Current => [F::SEARCH_PROFILE, F::RETRIEVAL_PROFILE],
            RetrievalMode::Historical { .. } => {
                [F::HISTORY_SEARCH_PROFILE, F::HISTORY_RETRIEVAL_PROFILE]
            }
        }
    }

    fn run(&mut self, ctx: &WorkContext, recorder: &AssertionRecorder) -> HarnessResult<()> {
        self.state = TestCaseState::Running;
        info!(test_case = %self.id, repository = ctx.connector().repository_name(), "Running test case");
        let result = self.execute(ctx, recorder);
        self.state = match result {
            Ok(()) => TestCaseState::Completed,
            Err(_) => TestCaseState::Aborted,
        };
        result
    }
}
