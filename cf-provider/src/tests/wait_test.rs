use std::time::Duration;

use mockall::Sequence;
use tokio::time::Instant;

use super::*;
use crate::wait::*;

const PG_STATUS_PATH: &str = "{.status.PostgresClusterStatus}";

fn cond(jsonpath: &str, value: Option<&str>, timeout_secs: u64, interval_secs: u64) -> WaitCondition {
    WaitCondition {
        timeout: Duration::from_secs(timeout_secs),
        poll_interval: Duration::from_secs(interval_secs),
        ..WaitCondition::new(jsonpath, value)
    }
}

fn delete_wait(timeout_secs: u64, interval_secs: u64) -> DeleteWait {
    DeleteWait {
        timeout: Duration::from_secs(timeout_secs),
        poll_interval: Duration::from_secs(interval_secs),
    }
}

// Every GET eventually comes back with a Running cluster, but only after `delay`
struct SlowClient {
    delay: Duration,
}

#[async_trait::async_trait]
impl ObjectClient for SlowClient {
    async fn get(&self, _obj: &ObjectRef) -> anyhow::Result<Option<DynamicObject>> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(pg_obj("Running")))
    }

    async fn apply(&self, _obj: &ObjectRef, _doc: &DynamicObject, _params: &ApplyParams) -> anyhow::Result<DynamicObject> {
        unimplemented!()
    }

    async fn delete(&self, _obj: &ObjectRef) -> anyhow::Result<DeleteOutcome> {
        unimplemented!()
    }
}

fn returning_status(client: &mut MockObjectClient, seq: &mut Sequence, times: usize, status: &'static str) {
    client
        .expect_get()
        .times(times)
        .in_sequence(seq)
        .returning(move |_| Ok(Some(pg_obj(status))));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_zero_timeout_checks_exactly_once(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(1).returning(|_| Ok(Some(pg_obj("Creating"))));

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 0, 5)], &cancel)
        .await
        .unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_satisfied_on_first_check(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(1).returning(|_| Ok(Some(pg_obj("Running"))));

    let start = Instant::now();
    assert_ok!(wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 60, 5)], &cancel).await);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_never_satisfied_times_out(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    // checks at 0s, 10s, 20s, and 30s
    client.expect_get().times(4).returning(|_| Ok(Some(pg_obj("Creating"))));

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 30, 10)], &cancel)
        .await
        .unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_ge!(start.elapsed(), Duration::from_secs(30));
    assert_le!(start.elapsed(), Duration::from_secs(40));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_hung_check_gives_up_within_one_interval(pg_ref: ObjectRef, cancel: CancellationToken) {
    let client = SlowClient { delay: Duration::from_secs(3600) };

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 30, 10)], &cancel)
        .await
        .unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_eq!(start.elapsed(), Duration::from_secs(40));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_slow_check_inside_the_window(pg_ref: ObjectRef, cancel: CancellationToken) {
    // zero timeout still gets one check, and the check has one interval to come back
    let client = SlowClient { delay: Duration::from_secs(3) };

    let start = Instant::now();
    assert_ok!(wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 0, 5)], &cancel).await);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_last_sleep_stops_at_the_timeout(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    // checks at 0s, 7s, 14s, 21s, 28s, and 30s
    client.expect_get().times(6).returning(|_| Ok(Some(pg_obj("Creating"))));

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 30, 7)], &cancel)
        .await
        .unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_eq!(start.elapsed(), Duration::from_secs(30));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_satisfied_after_polling(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    let mut seq = Sequence::new();
    client
        .expect_get()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    returning_status(&mut client, &mut seq, 2, "Creating");
    returning_status(&mut client, &mut seq, 1, "Running");

    let start = Instant::now();
    assert_ok!(wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 600, 5)], &cancel).await);
    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_not_found_error_means_not_yet(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    let mut seq = Sequence::new();
    client
        .expect_get()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(api_err(404)));
    returning_status(&mut client, &mut seq, 1, "Running");

    assert_ok!(wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, None, 600, 5)], &cancel).await);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_api_error_aborts(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(1).returning(|_| Err(api_err(403)));

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, None, 600, 5)], &cancel)
        .await
        .unwrap_err();

    assert_none!(err.downcast_ref::<ProviderError>());
    assert!(has_api_status(&err, 403));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_conditions_run_in_order(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    let mut seq = Sequence::new();
    // the first condition is met by the first object we see; the second needs one more poll
    returning_status(&mut client, &mut seq, 2, "Creating");
    returning_status(&mut client, &mut seq, 1, "Running");

    let conditions = [
        cond("{.metadata.resourceVersion}", None, 60, 5),
        cond(PG_STATUS_PATH, Some("Running"), 60, 5),
    ];
    let start = Instant::now();
    assert_ok!(wait_for_upsert(&client, &pg_ref, &conditions, &cancel).await);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_bad_jsonpath_never_polls(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().never();

    let conditions = [cond(PG_STATUS_PATH, None, 60, 5), cond("{.status[", None, 60, 5)];
    let err = wait_for_upsert(&client, &pg_ref, &conditions, &cancel).await.unwrap_err();
    assert_contains!(err.to_string(), "invalid JSONPath expression");
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_cancelled_mid_sleep(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(3).returning(|_| Ok(Some(pg_obj("Creating"))));

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, Some("Running"), 60, 5)], &cancel)
        .await
        .unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::Cancelled(_)));
    assert_eq!(start.elapsed(), Duration::from_secs(12));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_upsert_already_cancelled(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().never();
    cancel.cancel();

    let err = wait_for_upsert(&client, &pg_ref, &[cond(PG_STATUS_PATH, None, 60, 5)], &cancel)
        .await
        .unwrap_err();
    assert_provider_err(&err, |e| matches!(e, ProviderError::Cancelled(_)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_delete_stops_at_first_not_found(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    let mut seq = Sequence::new();
    returning_status(&mut client, &mut seq, 2, "Running");
    client
        .expect_get()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));

    let start = Instant::now();
    assert_ok!(wait_for_delete(&client, &pg_ref, &delete_wait(3600, 10), &cancel).await);
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_delete_not_found_error_means_gone(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(1).returning(|_| Err(api_err(404)));

    assert_ok!(wait_for_delete(&client, &pg_ref, &delete_wait(3600, 10), &cancel).await);
}

#[rstest]
#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_delete_errors_are_retried_until_timeout(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    // checks at 0s, 10s, and 20s
    client.expect_get().times(3).returning(|_| Err(api_err(500)));

    let start = Instant::now();
    let err = wait_for_delete(&client, &pg_ref, &delete_wait(20, 10), &cancel).await.unwrap_err();

    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_eq!(start.elapsed(), Duration::from_secs(20));
    assert!(logs_contain("will retry"));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_delete_zero_timeout_checks_exactly_once(pg_ref: ObjectRef, cancel: CancellationToken) {
    let mut client = MockObjectClient::new();
    client.expect_get().times(1).returning(|_| Ok(Some(pg_obj("Running"))));

    let start = Instant::now();
    let err = wait_for_delete(&client, &pg_ref, &delete_wait(0, 10), &cancel).await.unwrap_err();
    assert_provider_err(&err, |e| matches!(e, ProviderError::WaitTimeout(_)));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[rstest]
#[case::string_equal(".status.phase", Some("Running"), true)]
#[case::string_differs(".status.phase", Some("Pending"), false)]
#[case::number_as_text(".status.readyReplicas", Some("3"), true)]
#[case::bool_as_text(".status.ready", Some("true"), true)]
#[case::any_of_many(".status.conditions[*].status", Some("False"), true)]
#[case::filter(".status.conditions[?(@.type == 'Ready')].status", Some("True"), true)]
#[case::present(".status.phase", None, true)]
#[case::missing(".status.missing", None, false)]
#[case::missing_with_value(".status.missing", Some(""), false)]
#[case::empty_string(".status.message", None, false)]
#[case::null(".status.lastError", None, false)]
#[case::empty_list(".status.warnings", None, false)]
#[case::zero_is_not_empty(".status.restarts", None, true)]
fn test_condition_met(#[case] path: &str, #[case] expected: Option<&str>, #[case] met: bool) {
    let doc = json!({
        "status": {
            "phase": "Running",
            "readyReplicas": 3,
            "ready": true,
            "message": "",
            "lastError": null,
            "warnings": [],
            "restarts": 0,
            "conditions": [
                {"type": "Ready", "status": "True"},
                {"type": "Degraded", "status": "False"},
            ],
        },
    });
    let path = cf_core::jsonpath::JsonPath::parse(path).unwrap();
    assert_eq!(condition_met(&path, expected, &doc), met);
}

#[rstest]
fn test_wait_condition_defaults() {
    let cond: WaitCondition = serde_yaml::from_str("jsonpath: .status.phase").unwrap();
    assert_eq!(cond.timeout, Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECONDS));
    assert_eq!(cond.poll_interval, Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS));
    assert_none!(cond.value);

    assert!(serde_yaml::from_str::<WaitCondition>("{jsonpath: .status.phase, timeout: soon}").is_err());
}
