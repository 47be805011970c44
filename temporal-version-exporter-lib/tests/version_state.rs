mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{active_versions, sample, unknown_series, version_series, TestResult};
use prometheus::Registry;
use temporal_version_exporter_lib::probe::Target;
use temporal_version_exporter_lib::telemetry::encode_metrics;
use temporal_version_exporter_lib::{
    Indicator, ProbeError, ProbeResult, StaleSeriesPolicy, VersionState,
};

const ADDR: &str = "temporal-frontend:7233";

fn setup(policy: StaleSeriesPolicy) -> Result<(VersionState, Registry), Box<dyn std::error::Error + Send + Sync>> {
    let registry = Registry::new();
    let state = VersionState::register(&registry, policy)?;
    Ok((state, registry))
}

fn found(v: &str) -> ProbeResult {
    ProbeResult::VersionFound(v.to_string())
}

#[test]
fn found_version_sets_info_only() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let target = Target::new(ADDR);

    state.publish(&target, &found("1.2.3"));

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &version_series(ADDR, "1.2.3")), Some(1.0));
    assert_eq!(sample(&text, &unknown_series(ADDR)), None);
    assert_eq!(state.current(&target), Some(Indicator::Version("1.2.3".to_string())));
    Ok(())
}

#[test]
fn transport_error_sets_unknown_only() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let target = Target::new(ADDR);

    state.publish(
        &target,
        &ProbeResult::TransportError(ProbeError::DeadlineExceeded(Duration::from_secs(10))),
    );

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &unknown_series(ADDR)), Some(1.0));
    assert_eq!(active_versions(&text, ADDR), 0);
    Ok(())
}

#[test]
fn version_change_removes_previous_label() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let target = Target::new(ADDR);

    state.publish(&target, &found("1.0.0"));
    state.publish(&target, &found("1.1.0"));

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &version_series(ADDR, "1.1.0")), Some(1.0));
    assert_eq!(sample(&text, &version_series(ADDR, "1.0.0")), None);
    assert_eq!(active_versions(&text, ADDR), 1);
    Ok(())
}

#[test]
fn version_change_zeroes_previous_label() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Zero)?;
    let target = Target::new(ADDR);

    state.publish(&target, &found("1.0.0"));
    state.publish(&target, &found("1.1.0"));

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &version_series(ADDR, "1.1.0")), Some(1.0));
    assert_eq!(sample(&text, &version_series(ADDR, "1.0.0")), Some(0.0));
    assert_eq!(active_versions(&text, ADDR), 1);
    Ok(())
}

#[test]
fn unknown_then_found_clears_unknown() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let target = Target::new(ADDR);

    state.publish(&target, &ProbeResult::VersionUnknown);
    state.publish(&target, &found("1.24.0"));

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &unknown_series(ADDR)), None);
    assert_eq!(sample(&text, &version_series(ADDR, "1.24.0")), Some(1.0));
    Ok(())
}

#[test]
fn found_then_unknown_never_reports_both() -> TestResult {
    for policy in [StaleSeriesPolicy::Remove, StaleSeriesPolicy::Zero] {
        let (state, registry) = setup(policy)?;
        let target = Target::new(ADDR);

        state.publish(&target, &found("1.24.0"));
        state.publish(&target, &ProbeResult::VersionUnknown);

        let text = encode_metrics(&registry)?;
        assert_eq!(sample(&text, &unknown_series(ADDR)), Some(1.0), "{policy:?}");
        assert_eq!(active_versions(&text, ADDR), 0, "{policy:?}");
    }
    Ok(())
}

#[test]
fn publishing_twice_is_idempotent() -> TestResult {
    for result in [found("1.2.3"), ProbeResult::VersionUnknown] {
        let (state, registry) = setup(StaleSeriesPolicy::Zero)?;
        let target = Target::new(ADDR);

        state.publish(&target, &result);
        let first = encode_metrics(&registry)?;
        state.publish(&target, &result);
        let second = encode_metrics(&registry)?;

        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn targets_are_tracked_independently() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let a = Target::new("a:7233");
    let b = Target::new("b:7233");

    state.publish(&a, &found("1.0.0"));
    state.publish(&b, &ProbeResult::VersionUnknown);

    let text = encode_metrics(&registry)?;
    assert_eq!(sample(&text, &version_series("a:7233", "1.0.0")), Some(1.0));
    assert_eq!(sample(&text, &unknown_series("b:7233")), Some(1.0));
    assert_eq!(sample(&text, &unknown_series("a:7233")), None);
    Ok(())
}

#[test]
fn registering_twice_on_one_registry_fails() -> TestResult {
    let (_state, registry) = setup(StaleSeriesPolicy::Remove)?;
    assert!(VersionState::register(&registry, StaleSeriesPolicy::Remove).is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_readers_never_see_both_indicators() -> TestResult {
    let (state, registry) = setup(StaleSeriesPolicy::Remove)?;
    let state = Arc::new(state);
    let target = Target::new(ADDR);

    let writer = {
        let state = state.clone();
        let target = target.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                if i % 2 == 0 {
                    state.publish(&target, &found(&format!("1.{i}.0")));
                } else {
                    state.publish(&target, &ProbeResult::VersionUnknown);
                }
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..200 {
        let text = encode_metrics(&registry)?;
        let unknown = sample(&text, &unknown_series(ADDR)) == Some(1.0);
        let versions = active_versions(&text, ADDR);
        assert!(
            versions + usize::from(unknown) <= 1,
            "more than one indicator active:\n{text}"
        );
        tokio::task::yield_now().await;
    }

    writer.await?;
    Ok(())
}
