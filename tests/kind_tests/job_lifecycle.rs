//! Lifecycle stories against a real cluster.
//!
//! Each test creates its own Jobs, drives them through the controller the
//! way an operator would, and asserts on freshly read cluster state.

use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};

use job_assistant::state;

use super::helpers::{
    controller, create_job, delete_job, ensure_namespace, sleep_job, test_client, TEST_NAMESPACE,
};

#[tokio::test]
#[ignore = "requires a cluster - run with: cargo test --test kind -- --ignored"]
async fn suspended_job_runs_to_completion_after_run() {
    let client = test_client().await;
    ensure_namespace(&client).await;
    let ctl = controller(client.clone());

    let name = "e2e-resume";
    delete_job(&client, name).await;
    create_job(&client, &sleep_job(name, 0, true)).await;

    ctl.run(TEST_NAMESPACE, name).await.expect("run failed");

    // The control plane admits the job promptly once unsuspended
    super::helpers::wait_for_job(&client, name, Duration::from_secs(5), |job| {
        job.status
            .as_ref()
            .and_then(|s| s.start_time.as_ref())
            .is_some()
    })
    .await;

    // A zero-second sleep completes well inside the convergence budget
    super::helpers::wait_for_job(&client, name, Duration::from_secs(20), |job| {
        let status = job.status.clone().unwrap_or_default();
        status
            .conditions
            .unwrap_or_default()
            .iter()
            .any(|c| c.type_ == "Complete" && c.status == "True")
    })
    .await;

    delete_job(&client, name).await;
}

#[tokio::test]
#[ignore = "requires a cluster - run with: cargo test --test kind -- --ignored"]
async fn run_on_a_completed_job_recreates_it_under_a_new_uid() {
    let client = test_client().await;
    ensure_namespace(&client).await;
    let ctl = controller(client.clone());

    let name = "e2e-recreate";
    delete_job(&client, name).await;
    create_job(&client, &sleep_job(name, 0, false)).await;

    // Let the first execution finish
    super::helpers::wait_for_job(&client, name, Duration::from_secs(30), |job| {
        !state::is_running(&job.status.clone().unwrap_or_default())
            && job
                .status
                .as_ref()
                .and_then(|s| s.completion_time.as_ref())
                .is_some()
    })
    .await;

    let api: Api<k8s_openapi::api::batch::v1::Job> =
        Api::namespaced(client.clone(), TEST_NAMESPACE);
    let original = api.get(name).await.expect("job should exist");
    let original_uid = original.metadata.uid.clone().expect("uid set");

    ctl.run(TEST_NAMESPACE, name).await.expect("run failed");

    let recreated = api.get(name).await.expect("recreated job should exist");
    assert_ne!(
        recreated.metadata.uid.as_deref(),
        Some(original_uid.as_str()),
        "recreate must produce a new identity token"
    );
    // Definition survives the round trip
    assert_eq!(
        recreated
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(super::helpers::TEST_ANNOTATION))
            .map(String::as_str),
        Some("enable")
    );

    delete_job(&client, name).await;
}

#[tokio::test]
#[ignore = "requires a cluster - run with: cargo test --test kind -- --ignored"]
async fn run_while_running_is_refused_without_mutation() {
    let client = test_client().await;
    ensure_namespace(&client).await;
    let ctl = controller(client.clone());

    let name = "e2e-already-running";
    delete_job(&client, name).await;
    create_job(&client, &sleep_job(name, 120, false)).await;

    super::helpers::wait_for_job(&client, name, Duration::from_secs(30), |job| {
        state::is_running(&job.status.clone().unwrap_or_default())
    })
    .await;

    let before = ctl.status(TEST_NAMESPACE, name).await.expect("status");
    let err = ctl
        .run(TEST_NAMESPACE, name)
        .await
        .expect_err("second run must be refused");
    assert!(err.to_string().contains("already running"));

    let after = ctl.status(TEST_NAMESPACE, name).await.expect("status");
    assert_eq!(before.active, after.active);
    assert_eq!(before.conditions, after.conditions);

    ctl.kill(TEST_NAMESPACE, name).await.expect("cleanup kill");
    delete_job(&client, name).await;
}

#[tokio::test]
#[ignore = "requires a cluster - run with: cargo test --test kind -- --ignored"]
async fn kill_stops_pods_and_preserves_the_definition() {
    let client = test_client().await;
    ensure_namespace(&client).await;
    let ctl = controller(client.clone());

    let name = "e2e-kill";
    delete_job(&client, name).await;
    create_job(&client, &sleep_job(name, 300, false)).await;

    super::helpers::wait_for_job(&client, name, Duration::from_secs(30), |job| {
        job.status.as_ref().and_then(|s| s.active).unwrap_or(0) > 0
    })
    .await;

    ctl.kill(TEST_NAMESPACE, name).await.expect("kill failed");

    // Pods are gone the moment kill returns
    let pods: Api<Pod> = Api::namespaced(client.clone(), TEST_NAMESPACE);
    let remaining = pods
        .list(&ListParams::default().labels(&format!("job-name={name}")))
        .await
        .expect("pod list");
    assert!(remaining.items.is_empty(), "kill must tear down all pods");

    let status = ctl.status(TEST_NAMESPACE, name).await.expect("status");
    assert_eq!(status.active.unwrap_or(0), 0);

    // Definition preserved for a later Run
    let api: Api<k8s_openapi::api::batch::v1::Job> =
        Api::namespaced(client.clone(), TEST_NAMESPACE);
    assert!(api.get(name).await.is_ok(), "kill must not delete the job");

    // Killing again is a no-op, not an error
    ctl.kill(TEST_NAMESPACE, name).await.expect("second kill");

    delete_job(&client, name).await;
}

#[tokio::test]
#[ignore = "requires a cluster - run with: cargo test --test kind -- --ignored"]
async fn list_only_returns_jobs_with_the_exact_sentinel() {
    let client = test_client().await;
    ensure_namespace(&client).await;
    let ctl = controller(client.clone());

    let managed = "e2e-list-managed";
    let unmanaged = "e2e-list-unmanaged";
    delete_job(&client, managed).await;
    delete_job(&client, unmanaged).await;

    create_job(&client, &sleep_job(managed, 0, true)).await;
    let mut other = sleep_job(unmanaged, 0, true);
    other
        .metadata
        .annotations
        .as_mut()
        .unwrap()
        .insert(super::helpers::TEST_ANNOTATION.to_string(), "disable".to_string());
    create_job(&client, &other).await;

    let names: Vec<String> = ctl
        .list()
        .await
        .expect("list failed")
        .into_iter()
        .filter_map(|j| j.metadata.name)
        .collect();

    assert!(names.contains(&managed.to_string()));
    assert!(!names.contains(&unmanaged.to_string()));

    delete_job(&client, managed).await;
    delete_job(&client, unmanaged).await;
}
