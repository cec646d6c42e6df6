//! Executor pool end-to-end against a live mock target: execution, result
//! reporting, the invalid-URL short circuit, and per-host spacing.


use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use ezworker::coordinator::Reporter;
use ezworker::executor::ExecutorPool;
use ezworker::http::ReqwestClient;
use ezworker::job::{HttpMethod, Job, USER_AGENT};
use ezworker::limiter::HostRateLimiter;
use ezworker::queue::JobQueue;
use test_harness::{wait_for, MockCoordinator, MockTarget};

const REPORT_WAIT: Duration = Duration::from_secs(3);

fn spawn_pool(
    queue: Arc<JobQueue>,
    limiter: Arc<HostRateLimiter>,
    coordinator_url: String,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let client = ReqwestClient::new().unwrap();
    let reporter = Arc::new(Reporter::new(coordinator_url, client.clone()));
    ExecutorPool::new(queue, limiter, reporter, client).spawn(workers)
}

async fn join_pool(queue: &JobQueue, handles: Vec<JoinHandle<()>>) {
    queue.close().await;
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("executor should stop after close")
            .unwrap();
    }
}

fn get_job(id: &str, url: String) -> Job {
    Job::new(id.to_string(), url, HttpMethod::Get, None)
}

#[tokio::test]
async fn happy_single_job_is_executed_and_reported() {
    let coordinator = MockCoordinator::start().await;
    let target = MockTarget::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 2);

    queue
        .try_push(get_job("j1", target.url("/ok")))
        .await
        .unwrap();

    let report = coordinator
        .wait_for_report("j1", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], true);
    assert_eq!(report["status_code"], 200);
    assert_eq!(report["response_body"], "ok");
    assert_eq!(report["error"], serde_json::Value::Null);
    assert!(report["execution_time_ms"].is_u64());

    let hits = target.hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_agent.as_deref(), Some(USER_AGENT));
    assert!(hits[0].content_type.is_none(), "GET carries no content type");

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn post_body_is_forwarded_as_json() {
    let coordinator = MockCoordinator::start().await;
    let target = MockTarget::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 1);

    let payload = br#"{"k":1}"#.to_vec();
    queue
        .try_push(Job::new(
            "j-post".to_string(),
            target.url("/echo"),
            HttpMethod::Post,
            Some(payload.clone()),
        ))
        .await
        .unwrap();

    let report = coordinator
        .wait_for_report("j-post", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], true);
    assert_eq!(report["response_body"], r#"{"k":1}"#);

    let hits = target.hits().await;
    assert_eq!(hits[0].body, payload);
    assert_eq!(hits[0].content_type.as_deref(), Some("application/json"));

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn target_500_is_failure_without_error_kind() {
    let coordinator = MockCoordinator::start().await;
    let target = MockTarget::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 1);

    queue
        .try_push(get_job("j-boom", target.url("/boom")))
        .await
        .unwrap();

    let report = coordinator
        .wait_for_report("j-boom", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], false);
    assert_eq!(report["status_code"], 500);
    assert_eq!(report["response_body"], "boom");
    assert_eq!(report["error"], serde_json::Value::Null);

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn invalid_url_is_reported_without_touching_the_limiter() {
    let coordinator = MockCoordinator::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter.clone(), coordinator.base_url(), 1);

    queue
        .try_push(get_job("j-bad", "not a url".to_string()))
        .await
        .unwrap();

    let report = coordinator
        .wait_for_report("j-bad", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], false);
    assert_eq!(report["status_code"], serde_json::Value::Null);
    assert_eq!(report["error"], "InvalidUrl");

    // The target was never resolved, so no host entered the limiter.
    // (The reporter talks to the coordinator through its own client, not
    // the limiter.)
    assert_eq!(limiter.tracked_hosts().await, 0);

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn hostless_target_is_reported_as_no_host() {
    let coordinator = MockCoordinator::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter.clone(), coordinator.base_url(), 1);

    queue
        .try_push(get_job("j-hostless", "mailto:ops@example.com".to_string()))
        .await
        .unwrap();

    let report = coordinator
        .wait_for_report("j-hostless", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], false);
    assert_eq!(report["status_code"], serde_json::Value::Null);
    assert_eq!(report["error"], "NoHost");

    assert_eq!(limiter.tracked_hosts().await, 0);

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn per_job_timeout_surfaces_as_timeout_kind() {
    let coordinator = MockCoordinator::start().await;
    let target = MockTarget::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 1);

    let mut job = get_job("j-slow", target.url("/slow"));
    job.timeout_ms = 100;
    queue.try_push(job).await.unwrap();

    let report = coordinator
        .wait_for_report("j-slow", REPORT_WAIT)
        .await
        .expect("result should be reported");
    assert_eq!(report["success"], false);
    assert_eq!(report["error"], "Timeout");

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn same_host_jobs_are_spaced_by_the_limiter() {
    let coordinator = MockCoordinator::start().await;
    let target = MockTarget::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::with_min_interval(Duration::from_millis(
        300,
    )));
    // Two workers so both jobs are picked up back-to-back.
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 2);

    queue
        .try_push(get_job("j-a", target.url("/ok")))
        .await
        .unwrap();
    queue
        .try_push(get_job("j-b", target.url("/ok")))
        .await
        .unwrap();

    assert!(
        wait_for(
            || async { target.hit_count().await >= 2 },
            Duration::from_secs(3),
            Duration::from_millis(20),
        )
        .await,
        "both jobs should reach the target"
    );

    let hits = target.hits().await;
    let spacing = hits[1].at.duration_since(hits[0].at);
    assert!(
        spacing >= Duration::from_millis(280),
        "same-host sends only {:?} apart",
        spacing
    );

    for job_id in ["j-a", "j-b"] {
        let report = coordinator
            .wait_for_report(job_id, REPORT_WAIT)
            .await
            .expect("both results reported");
        assert_eq!(report["success"], true);
    }

    join_pool(&queue, handles).await;
}

#[tokio::test]
async fn workers_exit_once_the_queue_closes() {
    let coordinator = MockCoordinator::start().await;
    let queue = Arc::new(JobQueue::default());
    let limiter = Arc::new(HostRateLimiter::new(1.0));
    let handles = spawn_pool(queue.clone(), limiter, coordinator.base_url(), 4);

    // No work at all: closing must still release every worker.
    join_pool(&queue, handles).await;
}
