//! Slice control integration tests
//!
//! Drives `POST /run` over TCP against the simulated runtime and checks the
//! control requests each node receives.

use std::net::SocketAddr;
use std::sync::Arc;

use integration_tests::{
    http_post, init_test_logging, sim_runtime, TestResult, TEST_PLMN, TEST_RC_FUNCTION_ID,
};
use nextgric_e2sm::rc::SlicePrbQuota;
use nextgric_e2sm::{ElementValue, RanParam};
use nextgric_xapp::e2::GlobalE2NodeId;
use nextgric_xapp::rc::{TASK_EXECUTED, UNKNOWN_ENDPOINT};
use nextgric_xapp::{
    RcControlRunner, RequestError, RestServer, ShutdownReason, ShutdownSignal, SimE2Runtime,
};
use tokio::task::JoinHandle;

struct RestFixture {
    addr: SocketAddr,
    runtime: Arc<SimE2Runtime>,
    signal: ShutdownSignal,
    server: JoinHandle<()>,
}

impl RestFixture {
    async fn start(nodes: u32) -> TestResult<Self> {
        init_test_logging();

        let runtime = sim_runtime(nodes);
        let runner =
            Arc::new(RcControlRunner::new(runtime.clone(), TEST_PLMN, TEST_RC_FUNCTION_ID));
        let signal = ShutdownSignal::new();
        let server = RestServer::bind("127.0.0.1:0".parse()?, runner, signal.clone()).await?;
        let addr = server.local_addr()?;
        let server = tokio::spawn(server.serve(signal.subscribe()));

        Ok(Self {
            addr,
            runtime,
            signal,
            server,
        })
    }

    async fn stop(self) -> TestResult {
        self.signal.trigger(ShutdownReason::Requested);
        self.server.await?;
        Ok(())
    }
}

fn ratio_of(group: &[RanParam], id: u32) -> Option<i64> {
    match group.iter().find(|p| p.id == id)?.as_element()? {
        ElementValue::Integer(v) => Some(*v),
        _ => None,
    }
}

#[tokio::test]
async fn test_run_sends_one_request_per_node() -> TestResult {
    let fixture = RestFixture::start(3).await?;

    let (status, body) = http_post(
        fixture.addr,
        "/run",
        r#"{"sst": ["1", "5"], "sd": ["000080", "000082"], "dedicated_ratio_prb": [10, 20]}"#,
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(body, TASK_EXECUTED);

    let sent = fixture.runtime.sent_controls();
    assert_eq!(sent.len(), 3);
    let targets: Vec<_> = sent.iter().map(|c| c.node).collect();
    for nb_id in 1..=3 {
        assert!(targets.contains(&GlobalE2NodeId::gnb(TEST_PLMN, nb_id)));
    }

    for control in &sent {
        assert_eq!(control.ran_function_id, TEST_RC_FUNCTION_ID);
        assert_eq!(control.request.header.ric_style_type, 2);
        assert_eq!(control.request.header.control_action_id, 6);

        let groups = control.request.message.entries();
        assert_eq!(groups.len(), 2);
        for (group, ratio) in groups.iter().zip([10, 20]) {
            for id in [10, 11, 12] {
                assert_eq!(ratio_of(group, id), Some(ratio));
            }
        }
    }

    fixture.stop().await
}

#[tokio::test]
async fn test_missing_array_is_bad_request() -> TestResult {
    let fixture = RestFixture::start(1).await?;

    let (status, body) = http_post(
        fixture.addr,
        "/run",
        r#"{"sst": ["1"], "dedicated_ratio_prb": [30]}"#,
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(body, RequestError::MissingArrays.to_string());
    assert!(fixture.runtime.sent_controls().is_empty());

    fixture.stop().await
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() -> TestResult {
    let fixture = RestFixture::start(1).await?;

    let (status, body) = http_post(fixture.addr, "/run", "{\"sst\": [").await?;
    assert_eq!(status, 400);
    assert_eq!(body, "Invalid JSON structure\n");
    assert!(fixture.runtime.sent_controls().is_empty());

    fixture.stop().await
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() -> TestResult {
    let fixture = RestFixture::start(1).await?;

    let (status, body) = http_post(fixture.addr, "/unknown", "{}").await?;
    assert_eq!(status, 404);
    assert_eq!(body, UNKNOWN_ENDPOINT);
    assert!(!fixture.signal.is_triggered());

    fixture.stop().await
}

#[tokio::test]
async fn test_failing_node_does_not_block_others() -> TestResult {
    let fixture = RestFixture::start(2).await?;
    fixture.runtime.fail_control_for(GlobalE2NodeId::gnb(TEST_PLMN, 1));

    let (status, _) = http_post(
        fixture.addr,
        "/run",
        r#"{"sst": [1], "sd": ["000001"], "dedicated_ratio_prb": ["25"]}"#,
    )
    .await?;
    assert_eq!(status, 200);

    let sent = fixture.runtime.sent_controls();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].node, GlobalE2NodeId::gnb(TEST_PLMN, 2));
    assert_eq!(ratio_of(&sent[0].request.message.entries()[0], 12), Some(25));

    fixture.stop().await
}

#[tokio::test]
async fn test_runner_outcome_and_handover() -> TestResult {
    init_test_logging();

    let runtime = sim_runtime(2);
    runtime.fail_control_for(GlobalE2NodeId::gnb(TEST_PLMN, 2));
    let runner = RcControlRunner::new(runtime.clone(), TEST_PLMN, TEST_RC_FUNCTION_ID);

    let outcome = runner
        .run_slice_prb_quota(&[SlicePrbQuota::uniform("1", "000001", 50)])
        .await?;
    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.failed, vec![GlobalE2NodeId::gnb(TEST_PLMN, 2)]);
    assert_eq!(outcome.succeeded(), 1);

    let outcome = runner.run_handover_slice_level("1", "000080").await?;
    assert_eq!(outcome.succeeded(), 1);

    let sent = runtime.sent_controls();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].request.header.ric_style_type, 3);
    assert_eq!(sent[1].request.header.control_action_id, 1);
    Ok(())
}
