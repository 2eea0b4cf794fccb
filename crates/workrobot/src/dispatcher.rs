// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of message batches to a single webhook endpoint.
//!
//! Batches go out either in order, stopping at the first failure, or concurrently
//! with one task per message. The webhook allows roughly 20 messages per minute; the
//! dispatcher does not enforce it, so callers size their batches.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::errors::DispatchError;
use crate::message::Message;
use crate::transport::Transport;

/// How a concurrent batch reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first failure cancels the rest of the batch and is the only error reported.
    FailFast,
    /// Every message runs to completion and all failures are reported together.
    Aggregate,
}

pub struct Dispatcher<T: ?Sized> {
    transport: Arc<T>,
    endpoint: Arc<str>,
}

impl<T: ?Sized> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Dispatcher {
            transport: Arc::clone(&self.transport),
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Dispatcher::from_shared(Arc::new(transport), endpoint)
    }
}

impl<T: Transport + ?Sized + 'static> Dispatcher<T> {
    pub fn from_shared(transport: Arc<T>, endpoint: impl Into<String>) -> Self {
        Dispatcher {
            transport,
            endpoint: Arc::from(endpoint.into()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Sends `messages` in order and returns on the first failure, skipping the rest.
    pub async fn send(&self, messages: &[Message]) -> Result<(), DispatchError> {
        self.send_with_cancel(messages, &CancellationToken::new())
            .await
    }

    pub async fn send_with_cancel(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        debug!("Sending {} messages in order", messages.len());
        for (index, message) in messages.iter().enumerate() {
            let result = deliver(
                self.transport.as_ref(),
                &self.endpoint,
                message.encode(),
                cancel,
            )
            .await;
            if let Err(err) = result {
                error!(
                    "Failed to send {} message #{index}, skipping {} remaining: {err}",
                    message.kind(),
                    messages.len() - index - 1
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Sends every message on its own task and waits for all of them.
    pub async fn send_concurrent(
        &self,
        messages: &[Message],
        policy: FailurePolicy,
    ) -> Result<(), DispatchError> {
        self.send_concurrent_with_cancel(messages, policy, &CancellationToken::new())
            .await
    }

    /// Like [`Dispatcher::send_concurrent`]; cancelling `cancel` aborts the whole batch.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failing task claims the batch result
    /// and cancels its siblings; their own failures are discarded. Under
    /// [`FailurePolicy::Aggregate`] all failures are returned, cancellations folded into
    /// a single [`DispatchError::Cancelled`].
    pub async fn send_concurrent_with_cancel(
        &self,
        messages: &[Message],
        policy: FailurePolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        debug!(
            "Sending {} messages concurrently ({policy:?})",
            messages.len()
        );

        let batch_cancel = cancel.child_token();
        let claimed = Arc::new(AtomicBool::new(false));
        let mut join_set = JoinSet::new();

        for (index, message) in messages.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let endpoint = Arc::clone(&self.endpoint);
            let payload = message.encode();
            let batch_cancel = batch_cancel.clone();
            let claimed = Arc::clone(&claimed);
            join_set.spawn(async move {
                let result =
                    deliver(transport.as_ref(), &endpoint, payload, &batch_cancel).await;
                settle(index, result, policy, &claimed, &batch_cancel)
            });
        }

        let outcomes = join_set.join_all().await;
        match reduce(outcomes) {
            Some(err) => Err(err),
            None => {
                debug!("Successfully sent {} messages", messages.len());
                Ok(())
            }
        }
    }
}

enum Outcome {
    Delivered,
    Failed(DispatchError),
    Discarded,
}

async fn deliver<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &str,
    payload: Bytes,
    cancel: &CancellationToken,
) -> Result<(), DispatchError> {
    transport.send(endpoint, payload, cancel).await?.into_result()
}

fn settle(
    index: usize,
    result: Result<(), DispatchError>,
    policy: FailurePolicy,
    claimed: &AtomicBool,
    batch_cancel: &CancellationToken,
) -> Outcome {
    let err = match result {
        Ok(()) => return Outcome::Delivered,
        Err(err) => err,
    };

    match policy {
        FailurePolicy::FailFast => {
            if claimed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                error!("Failed to send message #{index}, cancelling the rest of the batch: {err}");
                batch_cancel.cancel();
                Outcome::Failed(err)
            } else {
                warn!("Discarding failure of message #{index} after fail-fast: {err}");
                Outcome::Discarded
            }
        }
        FailurePolicy::Aggregate => {
            error!("Failed to send message #{index}: {err}");
            Outcome::Failed(err)
        }
    }
}

fn reduce(outcomes: Vec<Outcome>) -> Option<DispatchError> {
    let mut errors = Vec::new();
    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            Outcome::Failed(err) if err.is_cancelled() => cancelled = true,
            Outcome::Failed(err) => errors.push(err),
            Outcome::Delivered | Outcome::Discarded => {}
        }
    }
    if cancelled {
        errors.push(DispatchError::Cancelled);
    }
    DispatchError::combine(errors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::Text;
    use crate::transport::Receipt;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tracing_test::traced_test;

    /// Rejects the listed contents right away and acknowledges the others after `delay`,
    /// unless cancelled first.
    struct ScriptedTransport {
        rejected: HashSet<String>,
        unreachable: HashSet<String>,
        delay: Duration,
        completed: AtomicUsize,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(rejected: &[&str], delay: Duration) -> Self {
            ScriptedTransport {
                rejected: rejected.iter().map(|s| s.to_string()).collect(),
                unreachable: HashSet::new(),
                delay,
                completed: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _endpoint: &str,
            payload: Bytes,
            cancel: &CancellationToken,
        ) -> Result<Receipt, DispatchError> {
            let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
            let content = value["text"]["content"].as_str().unwrap().to_string();
            self.sent.lock().unwrap().push(content.clone());

            let result = if self.rejected.contains(&content) {
                Ok(Receipt {
                    code: 40008,
                    message: content,
                })
            } else if self.unreachable.contains(&content) {
                Err(DispatchError::TransportFailed("connection refused".to_string()))
            } else {
                tokio::select! {
                    () = tokio::time::sleep(self.delay) => Ok(Receipt { code: 0, message: "ok".to_string() }),
                    () = cancel.cancelled() => Err(DispatchError::Cancelled),
                }
            };
            self.completed.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    fn batch(n: usize) -> Vec<Message> {
        (1..=n)
            .map(|i| Text::new(format!("m{i}")).unwrap().into())
            .collect()
    }

    fn rejected_message(err: &DispatchError) -> &str {
        match err {
            DispatchError::RemoteRejected { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sequential_stops_at_first_failure() {
        let dispatcher = Dispatcher::new(ScriptedTransport::new(&["m3"], Duration::ZERO), "hook");

        let err = dispatcher.send(&batch(5)).await.unwrap_err();

        assert_eq!(rejected_message(&err), "m3");
        assert_eq!(dispatcher.transport().sent(), ["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_sequential_success() {
        let dispatcher = Dispatcher::new(ScriptedTransport::new(&[], Duration::ZERO), "hook");
        dispatcher.send(&batch(3)).await.unwrap();
        assert_eq!(dispatcher.transport().sent(), ["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_fail_fast_returns_first_failure_and_cancels_the_rest() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&["m3"], Duration::from_secs(30)),
            "hook",
        );

        let started = Instant::now();
        let err = dispatcher
            .send_concurrent(&batch(5), FailurePolicy::FailFast)
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(err.errors().len(), 1);
        assert_eq!(rejected_message(&err), "m3");
        assert_eq!(dispatcher.transport().completed(), 5);
    }

    #[tokio::test]
    async fn test_fail_fast_reports_exactly_one_of_many_failures() {
        let all = ["m1", "m2", "m3", "m4", "m5"];
        let dispatcher = Dispatcher::new(ScriptedTransport::new(&all, Duration::ZERO), "hook");

        let err = dispatcher
            .send_concurrent(&batch(5), FailurePolicy::FailFast)
            .await
            .unwrap_err();

        assert!(all.contains(&rejected_message(&err)));
    }

    #[tokio::test]
    async fn test_aggregate_collects_every_failure_after_all_tasks() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&["m2", "m4"], Duration::from_millis(50)),
            "hook",
        );

        let err = dispatcher
            .send_concurrent(&batch(5), FailurePolicy::Aggregate)
            .await
            .unwrap_err();

        assert_eq!(dispatcher.transport().completed(), 5);
        let mut failed: Vec<&str> = err.errors().iter().map(rejected_message).collect();
        failed.sort_unstable();
        assert_eq!(failed, ["m2", "m4"]);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_error_kinds() {
        let mut transport = ScriptedTransport::new(&["m1"], Duration::ZERO);
        transport.unreachable.insert("m2".to_string());
        let dispatcher = Dispatcher::new(transport, "hook");

        let err = dispatcher
            .send_concurrent(&batch(3), FailurePolicy::Aggregate)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Aggregate(_)));
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, DispatchError::TransportFailed(_))));
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, DispatchError::RemoteRejected { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_success() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&[], Duration::from_millis(5)),
            "hook",
        );
        for policy in [FailurePolicy::FailFast, FailurePolicy::Aggregate] {
            dispatcher.send_concurrent(&batch(5), policy).await.unwrap();
        }
        assert_eq!(dispatcher.transport().completed(), 10);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let dispatcher = Dispatcher::new(ScriptedTransport::new(&[], Duration::ZERO), "hook");
        dispatcher.send(&[]).await.unwrap();
        dispatcher
            .send_concurrent(&[], FailurePolicy::Aggregate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_caller_cancellation_is_reported_once() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&[], Duration::from_secs(30)),
            "hook",
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = dispatcher
            .send_concurrent_with_cancel(&batch(4), FailurePolicy::Aggregate, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_batch_cancellation_does_not_touch_caller_token() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&["m1"], Duration::from_secs(30)),
            "hook",
        );
        let cancel = CancellationToken::new();

        let _ = dispatcher
            .send_concurrent_with_cancel(&batch(3), FailurePolicy::FailFast, &cancel)
            .await;

        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_dyn_transport() {
        let transport: Arc<dyn Transport> =
            Arc::new(ScriptedTransport::new(&[], Duration::ZERO));
        let dispatcher = Dispatcher::from_shared(transport, "hook");
        dispatcher.send(&batch(2)).await.unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fail_fast_logs_winner() {
        let dispatcher = Dispatcher::new(
            ScriptedTransport::new(&["m2"], Duration::from_secs(30)),
            "hook",
        );
        let _ = dispatcher
            .send_concurrent(&batch(3), FailurePolicy::FailFast)
            .await;

        assert!(logs_contain("cancelling the rest of the batch"));
    }
}
