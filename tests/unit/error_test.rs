//! Tests for error types

use nolan::core::{AdmissionError, ContextError, ExecError, JoinedError, SchedulerError};

#[test]
fn test_context_error_messages() {
    assert_eq!(ContextError::Cancelled.to_string(), "context canceled");
    assert_eq!(
        ContextError::DeadlineExceeded.to_string(),
        "context deadline exceeded"
    );
}

#[test]
fn test_admission_error_wraps_context_error() {
    let err = AdmissionError::from(ContextError::Cancelled);
    assert_eq!(err.to_string(), "admission aborted: context canceled");
    assert_eq!(err.context_error(), Some(ContextError::Cancelled));
    assert_eq!(AdmissionError::Closed.context_error(), None);
}

#[test]
fn test_scheduler_error_messages() {
    assert_eq!(
        SchedulerError::AlreadyTerminated.to_string(),
        "task scheduler already terminated"
    );
    assert_eq!(SchedulerError::QueueClosed.to_string(), "job queue closed");
    assert_eq!(
        SchedulerError::from(ContextError::DeadlineExceeded).to_string(),
        "stop interrupted: context deadline exceeded"
    );
    assert_eq!(
        SchedulerError::InvalidConfig("queue_capacity must be greater than 0".into()).to_string(),
        "invalid configuration: queue_capacity must be greater than 0"
    );
}

#[test]
fn test_joined_error_context_lookup_skips_delegate_errors() {
    let err = JoinedError::join(vec![
        ExecError::Delegate {
            index: 0,
            source: anyhow::anyhow!("upstream returned 503"),
        },
        ExecError::Admission {
            index: 1,
            source: AdmissionError::Aborted(ContextError::DeadlineExceeded),
        },
    ])
    .unwrap_err();

    assert_eq!(err.context_error(), Some(ContextError::DeadlineExceeded));
    let indices: Vec<_> = err
        .into_iter()
        .map(|e| match e {
            ExecError::Delegate { index, .. } | ExecError::Admission { index, .. } => index,
            other => panic!("unexpected error: {other}"),
        })
        .collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn test_joined_error_is_a_std_error() {
    fn as_anyhow(err: JoinedError) -> anyhow::Error {
        err.into()
    }
    let err = as_anyhow(JoinedError::single(ExecError::Aborted { index: 2 }));
    assert_eq!(err.to_string(), "delegate 2 aborted before completion");
}
