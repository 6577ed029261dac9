// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn outcome(result: Result<JobReport, JobFailure>) -> JobOutcome {
    JobOutcome {
        job_id: "job-1".to_string(),
        kind: "command",
        worker: Some("tumbal1_1_2_3_4".to_string()),
        result,
        elapsed: Duration::from_secs(2),
    }
}

#[test]
fn preview_leaves_short_output_alone() {
    assert_eq!(preview("hello", 10), "hello");
    assert_eq!(preview("", 10), "");
}

#[test]
fn preview_truncates_with_marker() {
    let long = "x".repeat(PREVIEW_LIMIT + 100);
    let shown = preview(&long, PREVIEW_LIMIT);
    assert!(shown.starts_with(&"x".repeat(PREVIEW_LIMIT)));
    assert!(shown.ends_with("(output truncated)"));
    assert_eq!(shown.chars().filter(|c| *c == 'x').count(), PREVIEW_LIMIT);
}

#[test]
fn preview_counts_characters_not_bytes() {
    let text = "é".repeat(10);
    let shown = preview(&text, 4);
    assert!(shown.starts_with("éééé\n"));
}

#[test]
fn tail_keeps_the_end_behind_a_marker() {
    assert_eq!(tail("abcdef", 3), "... (output truncated)\ndef");
    assert_eq!(tail("ab", 3), "ab");
    assert_eq!(tail("abc", 3), "abc");
}

#[parameterized(
    success = { Ok(JobReport::new("done")), JobStatus::Success },
    timeout = { Err(JobFailure::Timeout { after: Duration::from_secs(120) }), JobStatus::Timeout },
    connect = { Err(JobFailure::Connect { address: "1.2.3.4".into(), reason: "refused".into() }), JobStatus::Failure },
    mismatch = { Err(JobFailure::VerificationMismatch("file still present".into())), JobStatus::Failure },
)]
fn outcome_status_follows_result(result: Result<JobReport, JobFailure>, expected: JobStatus) {
    assert_eq!(outcome(result).status(), expected);
}

#[test]
fn render_success_includes_output() {
    let report = JobReport::new("command finished").with_output("line1\nline2");
    let text = outcome(Ok(report)).render();
    assert!(text.starts_with("✅ command on tumbal1_1_2_3_4: command finished"));
    assert!(text.ends_with("line1\nline2"));
}

#[test]
fn render_failure_includes_exit_code_and_output() {
    let text = outcome(Err(JobFailure::NonZeroExit {
        code: Some(2),
        output: "boom".to_string(),
    }))
    .render();
    assert!(text.contains("exit code 2"));
    assert!(text.ends_with("boom"));
}

#[test]
fn timeout_message_is_human_readable() {
    let failure = JobFailure::Timeout {
        after: Duration::from_secs(120),
    };
    assert_eq!(failure.to_string(), "timed out after 2m");
}

#[parameterized(
    local = { PublishSource::Local { path: PathBuf::from("/data/win10.img.gz") }, "win10.img.gz" },
    worker = { PublishSource::Worker { path: "/root/rdp-images/golden-win11.img".into() }, "golden-win11.img" },
    bare = { PublishSource::Worker { path: "plain.img".into() }, "plain.img" },
)]
fn publish_source_artifact_name(source: PublishSource, expected: &str) {
    assert_eq!(source.artifact_name(), expected);
}

#[test]
fn store_only_jobs_need_no_worker() {
    assert!(!JobKind::ListArtifacts.needs_worker());
    assert!(!JobKind::Delete { name: "a.img".into() }.needs_worker());
    assert!(!JobKind::Publish {
        source: PublishSource::Local { path: PathBuf::from("a.img") }
    }
    .needs_worker());
    assert!(JobKind::Publish {
        source: PublishSource::Worker { path: "a.img".into() }
    }
    .needs_worker());
    assert!(JobKind::Probe.needs_worker());
    assert!(JobKind::SyncCredentials.needs_worker());
}

#[test]
fn job_kind_serializes_as_tagged_union() {
    let kind = JobKind::BuildImage {
        os_code: "win10".to_string(),
        output_name: "golden-win10".to_string(),
    };
    let json = serde_json::to_value(&kind).unwrap();
    assert_eq!(json["kind"], "build_image");
    assert_eq!(json["os_code"], "win10");
    let back: JobKind = serde_json::from_value(json).unwrap();
    assert_eq!(back, kind);
}

#[test]
fn render_partial_failure_lists_per_target_lines() {
    let text = outcome(Err(JobFailure::Partial {
        failed: 1,
        total: 2,
        output: "✅ W1\n❌ W2: refused".to_string(),
    }))
    .render();
    assert!(text.contains("1 of 2 targets failed"));
    assert!(text.ends_with("❌ W2: refused"));
}
