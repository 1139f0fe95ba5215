#[cfg(test)]
mod tests {
    use crate::errors::HarnessError;
    use crate::wait::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test]
    async fn poller_returns_early_when_the_condition_holds() {
        let poller = Poller::new(Duration::from_secs(5), Duration::from_millis(10)).unwrap();
        let calls = Arc::new(AtomicU32::new(0));
        let probe_calls = Arc::clone(&calls);

        let start = Instant::now();
        let result = poller
            .run(move || {
                let calls = Arc::clone(&probe_calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
                        Ok::<_, HarnessError>(Some(42))
                    } else {
                        Ok(None)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Nowhere near the 5s budget
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn poller_expires_within_one_interval_of_the_budget() {
        let timeout = Duration::from_millis(100);
        let interval = Duration::from_millis(40);
        let poller = Poller::new(timeout, interval).unwrap();

        let start = Instant::now();
        let result = poller
            .run(|| async { Ok::<Option<()>, HarnessError>(None) })
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(result, None);
        // No earlier than the budget, no later than budget + interval
        // (plus scheduling slack)
        assert!(elapsed >= timeout, "expired too early: {:?}", elapsed);
        assert!(
            elapsed < timeout + interval + Duration::from_millis(200),
            "expired too late: {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn poller_propagates_fatal_errors_immediately() {
        let poller = Poller::new(Duration::from_secs(5), Duration::from_millis(10)).unwrap();
        let calls = Arc::new(AtomicU32::new(0));
        let probe_calls = Arc::clone(&calls);

        let start = Instant::now();
        let result = poller
            .run(move || {
                let calls = Arc::clone(&probe_calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<Option<()>, _>(HarnessError::Driver("invalid session id".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(HarnessError::Driver(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn poller_rejects_non_positive_timing() {
        let err = Poller::new(Duration::ZERO, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));

        let err = Poller::new(Duration::from_secs(1), Duration::ZERO).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn wait_spec_defaults_and_overrides() {
        let spec = WaitSpec::new(Target::css("#login-button"), Condition::Clickable);
        assert_eq!(spec.timeout, DEFAULT_TIMEOUT);
        assert_eq!(spec.poll, DEFAULT_POLL_INTERVAL);

        let spec = spec
            .with_timeout(Duration::from_secs(3))
            .with_poll(Duration::from_millis(100));
        assert_eq!(spec.timeout, Duration::from_secs(3));
        assert_eq!(spec.poll, Duration::from_millis(100));
    }

    #[test]
    fn absorb_timeout_maps_only_the_timeout_class() {
        assert_eq!(absorb_timeout(Ok(7)).unwrap(), Some(7));

        let timed_out: Result<u32, _> = Err(HarnessError::Timeout {
            condition: "css '#x' to be visible".to_string(),
            waited: Duration::from_secs(15),
        });
        assert_eq!(absorb_timeout(timed_out).unwrap(), None);

        let driver: Result<u32, _> =
            Err(HarnessError::Driver("invalid session id".to_string()));
        assert!(matches!(
            absorb_timeout(driver),
            Err(HarnessError::Driver(_))
        ));

        let config: Result<u32, _> = Err(HarnessError::Config("bad key".to_string()));
        assert!(matches!(
            absorb_timeout(config),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn targets_and_conditions_describe_themselves() {
        assert_eq!(
            Target::css("[data-test='error']").to_string(),
            "css '[data-test='error']'"
        );
        assert_eq!(Target::id("user-name").to_string(), "id 'user-name'");
        assert_eq!(Condition::Visible.to_string(), "visible");
        assert_eq!(
            Condition::TextEquals("Epic sadface".to_string()).to_string(),
            "showing the exact text 'Epic sadface'"
        );
        assert_eq!(
            Condition::AttributeContains {
                name: "class".to_string(),
                value: "error".to_string(),
            }
            .to_string(),
            "having attribute 'class' containing 'error'"
        );
    }
}
