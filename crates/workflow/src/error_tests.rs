use super::*;

#[test]
fn task_failed_reports_states_task_failed_code() {
    let err = WorkflowError::task_failed("boom");
    assert_eq!(err.error_code(), "States.TaskFailed");
    assert_eq!(err.cause(), "boom");
}

#[test]
fn no_choice_matched_has_fixed_code() {
    let err = WorkflowError::no_choice_matched();
    assert_eq!(err.error_code(), "States.NoChoiceMatched");
}

#[test]
fn not_found_falls_back_to_runtime_code() {
    let err = WorkflowError::NotFound("orders".to_string());
    assert_eq!(err.error_code(), "States.Runtime");
    assert!(err.cause().contains("orders"));
}

#[test]
fn timeout_reports_states_timeout_code() {
    let err = WorkflowError::timeout("exceeded 5s");
    assert_eq!(err.error_code(), "States.Timeout");
    assert_eq!(err.cause(), "exceeded 5s");
}
