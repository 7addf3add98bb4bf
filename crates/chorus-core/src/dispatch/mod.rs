//! Concurrent fan-out of one prompt to every configured adapter.
//!
//! The dispatcher spawns one task per adapter so that latency or faults in
//! one provider never block or corrupt another's entry. Results are
//! reassembled by input index, so the returned set always matches the
//! order the providers were configured in.

mod aggregate;
mod normalize;

pub use aggregate::aggregate;
pub use normalize::normalize;

use crate::adapters::ProviderAdapter;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, ProviderError};
use crate::types::{CallTimer, ComparisonSet, Prompt};
use std::sync::Arc;
use std::time::Duration;

/// Dispatch-level options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Optional overall deadline per dispatch. An adapter still running at
    /// the deadline settles as a timeout failure; siblings are unaffected.
    pub deadline: Option<Duration>,
}

impl DispatchOptions {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            deadline: config.deadline_ms.map(Duration::from_millis),
        }
    }
}

/// Fans one prompt out to N adapters and collects their settled results.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    /// Invoke every adapter exactly once for the prompt and return one
    /// entry per adapter, in input order.
    ///
    /// Fails (before any adapter runs) only on caller misuse: a blank
    /// prompt, an empty adapter list, or a modality hint that matches no
    /// configured adapter. Per-adapter failures are recorded as labeled
    /// failure entries, never surfaced as errors.
    pub async fn dispatch(
        &self,
        prompt: &Prompt,
        adapters: &[Arc<dyn ProviderAdapter>],
    ) -> Result<ComparisonSet, DispatchError> {
        if prompt.is_blank() {
            return Err(DispatchError::InvalidPrompt("prompt is empty".to_string()));
        }
        if adapters.is_empty() {
            return Err(DispatchError::NoProviders);
        }
        if let Some(hint) = prompt.modality() {
            if !adapters.iter().any(|a| a.spec().modality == hint) {
                return Err(DispatchError::InvalidPrompt(format!(
                    "modality hint '{hint}' matches none of the configured providers"
                )));
            }
        }

        tracing::debug!(
            providers = adapters.len(),
            deadline = ?self.options.deadline,
            "Dispatching prompt to {} adapters",
            adapters.len()
        );

        let deadline = self.options.deadline;
        let handles: Vec<_> = adapters
            .iter()
            .map(|adapter| {
                let adapter = adapter.clone();
                let prompt = prompt.clone();
                tokio::spawn(async move {
                    let timer = CallTimer::start();
                    let outcome = match deadline {
                        Some(limit) => {
                            match tokio::time::timeout(limit, adapter.generate(&prompt)).await {
                                Ok(settled) => settled,
                                Err(_) => Err(ProviderError::Timeout {
                                    deadline_ms: limit.as_millis() as u64,
                                }),
                            }
                        }
                        None => adapter.generate(&prompt).await,
                    };
                    normalize(adapter.spec().clone(), outcome, timer.stop())
                })
            })
            .collect();

        // join_all preserves spawn order, which is input provider order.
        let settled = futures_util::future::join_all(handles).await;

        let mut results = Vec::with_capacity(adapters.len());
        for (idx, joined) in settled.into_iter().enumerate() {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // A panicking adapter still gets a labeled entry so the
                    // set stays complete.
                    tracing::error!("Adapter task for {} panicked: {e}", adapters[idx].spec());
                    results.push(normalize(
                        adapters[idx].spec().clone(),
                        Err(ProviderError::Unknown {
                            message: format!("adapter task panicked: {e}"),
                        }),
                        CallTimer::start().stop(),
                    ));
                }
            }
        }

        Ok(aggregate(prompt, adapters.len(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::retry::{RetryAdapter, RetryPolicy};
    use crate::error::{ErrorKind, ProviderResult};
    use crate::types::{Modality, Payload, ProviderSpec, Status};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A configurable mock adapter for dispatcher behavior tests.
    ///
    /// Each call to `generate()` invokes the response factory with the
    /// current call index, allowing per-attempt results.
    struct MockAdapter {
        spec: ProviderSpec,
        response_fn: Box<dyn Fn(u32) -> ProviderResult<Payload> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        delay: Option<Duration>,
    }

    impl MockAdapter {
        fn succeeding(provider: &str, text: &str) -> Self {
            let text = text.to_string();
            Self {
                spec: ProviderSpec::new(provider, "mock-v1", Modality::Text),
                response_fn: Box::new(move |_| Ok(Payload::text(text.clone()))),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        fn failing(provider: &str, error: ProviderError) -> Self {
            Self {
                spec: ProviderSpec::new(provider, "mock-v1", Modality::Text),
                response_fn: Box::new(move |_| Err(error.clone())),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        fn image(provider: &str, bytes: Vec<u8>) -> Self {
            Self {
                spec: ProviderSpec::new(provider, "mock-v1", Modality::Image),
                response_fn: Box::new(move |_| Ok(Payload::image(bytes.clone(), "png"))),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Get a shared handle to the call counter (clone before moving).
        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn spec(&self) -> &ProviderSpec {
            &self.spec
        }

        async fn generate(&self, _prompt: &Prompt) -> ProviderResult<Payload> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)(idx)
        }
    }

    fn adapters(mocks: Vec<MockAdapter>) -> Vec<Arc<dyn ProviderAdapter>> {
        mocks
            .into_iter()
            .map(|m| Arc::new(m) as Arc<dyn ProviderAdapter>)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_all_succeed_in_input_order() {
        let list = adapters(vec![
            MockAdapter::succeeding("alpha", "from alpha"),
            MockAdapter::succeeding("beta", "from beta"),
            MockAdapter::succeeding("gamma", "from gamma"),
        ]);
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("explain quantum entanglement"), &list)
            .await
            .unwrap();

        assert_eq!(set.len(), 3);
        let providers: Vec<_> = set.iter().map(|r| r.spec.provider.as_str()).collect();
        assert_eq!(providers, ["alpha", "beta", "gamma"]);
        assert!(set.iter().all(|r| r.is_success()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_order_independent_of_completion_order() {
        // The first adapter is by far the slowest; output order must still
        // match input order.
        let list = adapters(vec![
            MockAdapter::succeeding("slow", "s").with_delay(Duration::from_millis(150)),
            MockAdapter::succeeding("medium", "m").with_delay(Duration::from_millis(50)),
            MockAdapter::succeeding("fast", "f"),
        ]);
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &list)
            .await
            .unwrap();

        let providers: Vec<_> = set.iter().map(|r| r.spec.provider.as_str()).collect();
        assert_eq!(providers, ["slow", "medium", "fast"]);
        assert!(set.results()[0].latency >= Duration::from_millis(150));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_adapters_run_concurrently() {
        // Three adapters sleeping 100ms each: concurrent dispatch settles
        // well under the 300ms a sequential loop would need.
        let list = adapters(vec![
            MockAdapter::succeeding("a", "a").with_delay(Duration::from_millis(100)),
            MockAdapter::succeeding("b", "b").with_delay(Duration::from_millis(100)),
            MockAdapter::succeeding("c", "c").with_delay(Duration::from_millis(100)),
        ]);
        let t0 = std::time::Instant::now();
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &list)
            .await
            .unwrap();
        assert_eq!(set.len(), 3);
        assert!(
            t0.elapsed() < Duration::from_millis(280),
            "dispatch took {:?}, expected concurrent execution",
            t0.elapsed()
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_failure_does_not_abort_siblings() {
        let list = adapters(vec![
            MockAdapter::succeeding("model-a", "answer a"),
            MockAdapter::failing(
                "model-b",
                ProviderError::Auth {
                    message: "bad key".to_string(),
                },
            ),
            MockAdapter::succeeding("model-c", "answer c"),
        ]);
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("explain quantum entanglement"), &list)
            .await
            .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.success_count(), 2);
        let failed = &set.results()[1];
        assert_eq!(failed.status, Status::Failure);
        assert_eq!(failed.error.as_ref().unwrap().kind, ErrorKind::Auth);
        assert_eq!(set.results()[0].payload, Some(Payload::text("answer a")));
        assert_eq!(set.results()[2].payload, Some(Payload::text("answer c")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_specs_yield_independent_entries() {
        let list = adapters(vec![
            MockAdapter::succeeding("twin", "first"),
            MockAdapter::succeeding("twin", "second"),
        ]);
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &list)
            .await
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.results()[0].spec, set.results()[1].spec);
        assert_eq!(set.results()[0].payload, Some(Payload::text("first")));
        assert_eq!(set.results()[1].payload, Some(Payload::text("second")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blank_prompt_rejected_before_any_call() {
        let mock = MockAdapter::succeeding("a", "unreached");
        let calls = mock.call_count_handle();
        let list = adapters(vec![mock]);

        let err = Dispatcher::default()
            .dispatch(&Prompt::new("   "), &list)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPrompt(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_provider_list_rejected() {
        let err = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &[])
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::NoProviders);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_modality_hint_conflicting_with_all_adapters() {
        let mock = MockAdapter::succeeding("texty", "unreached");
        let calls = mock.call_count_handle();
        let list = adapters(vec![mock]);

        let err = Dispatcher::default()
            .dispatch(&Prompt::new("a red fox").with_modality(Modality::Image), &list)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPrompt(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_modality_hint_matching_one_adapter_invokes_all() {
        // Hint matches the image adapter only; every adapter is still
        // invoked exactly once.
        let text_mock = MockAdapter::succeeding("texty", "t");
        let text_calls = text_mock.call_count_handle();
        let image_mock = MockAdapter::image("imagey", vec![9, 9]);
        let image_calls = image_mock.call_count_handle();
        let list = adapters(vec![text_mock, image_mock]);

        let set = Dispatcher::default()
            .dispatch(&Prompt::new("a red fox").with_modality(Modality::Image), &list)
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(text_calls.load(Ordering::SeqCst), 1);
        assert_eq!(image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_deadline_converts_to_timeout_entry() {
        let list = adapters(vec![
            MockAdapter::succeeding("slow", "too late").with_delay(Duration::from_secs(5)),
            MockAdapter::succeeding("fast", "made it"),
        ]);
        let dispatcher = Dispatcher::new(DispatchOptions {
            deadline: Some(Duration::from_millis(50)),
        });
        let set = dispatcher.dispatch(&Prompt::new("p"), &list).await.unwrap();

        assert_eq!(set.len(), 2);
        let timed_out = &set.results()[0];
        assert_eq!(timed_out.status, Status::Failure);
        assert_eq!(timed_out.error.as_ref().unwrap().kind, ErrorKind::Timeout);
        assert!(set.results()[1].is_success());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_deadline_waits_for_slow_adapter() {
        let list = adapters(vec![
            MockAdapter::succeeding("slow", "worth the wait").with_delay(Duration::from_millis(200)),
        ]);
        let set = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &list)
            .await
            .unwrap();
        assert!(set.results()[0].is_success());
        assert_eq!(
            set.results()[0].payload,
            Some(Payload::text("worth the wait"))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_throttled_adapter_retries_to_bound_then_settles_as_failure() {
        // Retry behavior composed through the adapter layer: the dispatcher
        // sees one settled failure after the wrapper exhausts its bound.
        let mock = MockAdapter::failing(
            "throttled",
            ProviderError::Throttle {
                message: "rate limited".to_string(),
            },
        );
        let calls = mock.call_count_handle();
        let wrapped: Arc<dyn ProviderAdapter> = Arc::new(RetryAdapter::new(
            Box::new(mock),
            RetryPolicy {
                attempts: 2,
                base_delay_ms: 1,
            },
        ));

        let set = Dispatcher::default()
            .dispatch(&Prompt::new("p"), &[wrapped])
            .await
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.results()[0].error.as_ref().unwrap().kind,
            ErrorKind::Throttle
        );
        // 1 initial + 2 retries = 3 total calls
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_image_comparison_scenario() {
        let list = adapters(vec![
            MockAdapter::image("titan", vec![0xAA, 0xBB]),
            MockAdapter::image("stability", vec![0xCC, 0xDD]),
        ]);
        let set = Dispatcher::default()
            .dispatch(
                &Prompt::new("a red fox in snow").with_modality(Modality::Image),
                &list,
            )
            .await
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.results()[0].payload,
            Some(Payload::image(vec![0xAA, 0xBB], "png"))
        );
        assert_eq!(
            set.results()[1].payload,
            Some(Payload::image(vec![0xCC, 0xDD], "png"))
        );
    }
}
