// SPDX-License-Identifier: PMPL-1.0-or-later
//! Execution engine.
//!
//! Runs a resolved rule list against one document. Rules are awaited one at a
//! time in resolution order, each under its own timeout, and each rule's
//! findings are appended as a single batch once it completes. That keeps the
//! exposed order equal to resolution order, then report order, however long
//! individual rules suspend.

use crate::document::DocumentModel;
use crate::error::{Error, Result, RuleError};
use crate::finding::{ResultAggregator, RuleTimeout, RunResult};
use crate::rules::{FindingSink, RuleCatalog};
use crate::selector::{self, RunOptions, Selection};
use crate::suite::SuiteRegistry;
use std::any::Any;
use std::future::{poll_fn, Future};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::Poll;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default bound on a single rule's run time
pub const DEFAULT_RULE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared flag that stops a run from dispatching further rules.
///
/// Rules already in flight are not interrupted; they finish or hit their
/// timeout as usual.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Runs rules from a catalog
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<RuleCatalog>,
    rule_timeout: Duration,
}

impl Engine {
    /// Create an engine with the default rule timeout
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self {
            catalog,
            rule_timeout: DEFAULT_RULE_TIMEOUT,
        }
    }

    pub fn with_rule_timeout(mut self, timeout: Duration) -> Self {
        self.rule_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn rule_timeout(&self) -> Duration {
        self.rule_timeout
    }

    /// Resolve `options` and run the resulting selection
    pub async fn check(
        &self,
        document: &DocumentModel,
        options: &RunOptions,
        suites: &SuiteRegistry,
    ) -> Result<RunResult> {
        let selection = selector::resolve(options, suites, &self.catalog)?;
        self.run(document, &selection).await
    }

    /// Run every selected rule to completion
    pub async fn run(&self, document: &DocumentModel, selection: &Selection) -> Result<RunResult> {
        self.run_with_cancel(document, selection, &CancelHandle::new())
            .await
    }

    /// Run the selection, stopping dispatch once `cancel` is raised.
    ///
    /// A rule that exceeds the timeout is skipped and recorded on the result.
    /// A rule that returns an error or panics aborts the run.
    pub async fn run_with_cancel(
        &self,
        document: &DocumentModel,
        selection: &Selection,
        cancel: &CancelHandle,
    ) -> Result<RunResult> {
        let started = Instant::now();
        let mut aggregator = ResultAggregator::new();

        info!("Running {} rule(s)", selection.len());

        for selected in selection.rules() {
            if cancel.is_cancelled() {
                warn!("Run cancelled before {}; remaining rules skipped", selected.id);
                aggregator.mark_cancelled();
                break;
            }

            let rule = self
                .catalog
                .get(&selected.id)
                .ok_or_else(|| Error::UnknownRule(selected.id.clone()))?;

            debug!("Dispatching {}", selected.id);
            let mut sink = FindingSink::new(rule.as_ref(), &selected.config);
            let outcome = tokio::time::timeout(
                self.rule_timeout,
                catch_panic(rule.evaluate(document, &mut sink)),
            )
            .await;

            match outcome {
                Ok(Ok(Ok(()))) => {
                    debug!("{} completed with {} finding(s)", selected.id, sink.len());
                    aggregator.append_batch(sink.into_findings());
                }
                Ok(Ok(Err(cause))) => {
                    error!("{} failed: {}", selected.id, cause);
                    return Err(Error::RuleExecution {
                        rule_id: selected.id.clone(),
                        cause,
                    });
                }
                Ok(Err(message)) => {
                    error!("{} panicked: {}", selected.id, message);
                    return Err(Error::RuleExecution {
                        rule_id: selected.id.clone(),
                        cause: RuleError::Failed(format!("panicked: {}", message)),
                    });
                }
                Err(_) => {
                    warn!(
                        "{} did not complete within {}ms; skipping",
                        selected.id,
                        self.rule_timeout.as_millis()
                    );
                    aggregator.record_timeout(RuleTimeout::new(&selected.id, self.rule_timeout));
                }
            }
        }

        let result = aggregator.freeze();
        info!(
            "Run finished in {}ms: {} finding(s), {} timed out{}",
            started.elapsed().as_millis(),
            result.len(),
            result.timed_out().len(),
            if result.was_cancelled() { ", cancelled" } else { "" }
        );
        Ok(result)
    }
}

/// Resolves like `evaluation`, or to the panic message if polling it panics
fn catch_panic<F>(
    mut evaluation: F,
) -> impl Future<Output = std::result::Result<F::Output, String>>
where
    F: Future + Unpin,
{
    poll_fn(move |cx| {
        match panic::catch_unwind(AssertUnwindSafe(|| Pin::new(&mut evaluation).poll(cx))) {
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(panic_message(payload.as_ref()))),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
