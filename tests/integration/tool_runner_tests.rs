/*!
 * Process runner tests against programs every Unix system has
 */

use std::time::Duration;

use subtrans::errors::ToolError;
use subtrans::extraction::{ProcessToolRunner, ToolRunner};

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_withSuccessfulCommand_shouldCaptureOutput() {
    let runner = ProcessToolRunner::new(Duration::from_secs(10), 4096);

    let output = runner.run("sh", &sh("echo hello; echo oops >&2")).await.unwrap();

    assert!(output.success);
    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.stdout.trim(), "hello");
    assert_eq!(output.stderr.trim(), "oops");
    assert!(!output.truncated);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_withFailingCommand_shouldReportExitCode() {
    let runner = ProcessToolRunner::new(Duration::from_secs(10), 4096);

    let output = runner.run("sh", &sh("echo 'Conversion failed!' >&2; exit 3")).await.unwrap();

    assert!(!output.success);
    assert_eq!(output.exit_code, Some(3));
    assert!(output.stderr.contains("Conversion failed!"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_withLargeOutput_shouldTruncateAndStillFinish() {
    let runner = ProcessToolRunner::new(Duration::from_secs(10), 100);

    let output = runner.run("sh", &sh("i=0; while [ $i -lt 2000 ]; do echo line-$i; i=$((i+1)); done")).await.unwrap();

    assert!(output.success);
    assert!(output.truncated);
    assert_eq!(output.stdout.len(), 100);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_withSlowCommand_shouldTimeOut() {
    let runner = ProcessToolRunner::new(Duration::from_millis(200), 4096);

    let result = runner.run("sh", &sh("sleep 10")).await;

    assert!(matches!(result, Err(ToolError::TimedOut { ref program, .. }) if program == "sh"));
}
