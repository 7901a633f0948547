//! Produces a clean copy of a Job definition suitable for resubmission.
//!
//! Recreating a finished Job under the same name requires stripping every
//! field the API server assigned on the original create (identity, version,
//! audit trail) and repopulating the pod selector: `spec.selector` is
//! immutable server-side once set, so the copy must carry it explicitly and
//! declare `manualSelector` or the create is rejected.

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

/// Label key Kubernetes uses to link a Job's pods back to it.
///
/// The API server injects this automatically on first creation; a recreated
/// Job with a manual selector must mimic it so pod lookups by
/// `job-name=<name>` keep working.
pub const JOB_NAME_LABEL: &str = "job-name";

/// Return a copy of `original` ready to be submitted as a fresh create.
///
/// Orchestrator-assigned metadata is cleared, status is emptied, and the
/// selector/template label pair is reconciled so the new Job's pods remain
/// addressable under the same `job-name` convention as the original's.
pub fn sanitize_for_recreate(original: &Job) -> Job {
    let mut job = original.clone();

    // Fields that must not be reused on a fresh create
    job.metadata.resource_version = None;
    job.metadata.uid = None;
    job.metadata.generation = None;
    job.metadata.creation_timestamp = None;
    job.metadata.managed_fields = None;
    job.metadata.self_link = None;
    job.metadata.finalizers = None;
    job.metadata.owner_references = None;
    job.metadata.deletion_timestamp = None;
    job.metadata.deletion_grace_period_seconds = None;

    job.status = None;

    reconcile_selector(&mut job);

    job
}

/// Reconcile `spec.selector` with the pod template labels:
/// user-supplied match labels are kept, the standard `job-name` linkage is
/// injected where Kubernetes would otherwise have synthesized it.
fn reconcile_selector(job: &mut Job) {
    let name = job.metadata.name.clone().unwrap_or_default();

    let Some(spec) = job.spec.as_mut() else {
        return;
    };

    let selector = spec.selector.get_or_insert_with(LabelSelector::default);
    let match_labels = selector.match_labels.get_or_insert_with(Default::default);

    // We are setting the selector ourselves now
    spec.manual_selector = Some(true);

    match_labels
        .entry(JOB_NAME_LABEL.to_string())
        .or_insert_with(|| name.clone());

    let template_meta = spec.template.metadata.get_or_insert_with(Default::default);
    let template_labels = template_meta.labels.get_or_insert_with(Default::default);
    template_labels.insert(JOB_NAME_LABEL.to_string(), name);
}
