//! Integration tests for `texdock analyze`

mod common;

use common::{stdout_json, TestProject, ERROR_LOG, WARNING_LOG};

#[test]
fn test_clean_log_passes() {
    let project = TestProject::new();
    project.create_file(
        "resume.log",
        "This is pdfTeX\nOutput written on resume.pdf (2 pages, 50000 bytes).\n",
    );

    let output = project.run(&["analyze", "resume.log"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Quality check passed"));
    assert!(stdout.contains("Pages:          2"));
}

#[test]
fn test_error_log_fails() {
    let project = TestProject::new();
    project.create_file("resume.log", ERROR_LOG);

    let output = project.run(&["--json", "analyze", "resume.log"]);
    assert!(!output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["passed"], false);
    assert_eq!(json["failure"]["reason"], "fatal");
    assert_eq!(json["stats"]["errors"][0]["message"], "Undefined control sequence.");
    assert_eq!(json["stats"]["errors"][0]["line"], "42");
}

#[test]
fn test_warnings_only_fail_in_strict_mode() {
    let project = TestProject::new();
    project.create_file("resume.log", WARNING_LOG);

    let lenient = project.run(&["--json", "analyze", "resume.log"]);
    assert!(lenient.status.success());
    let json = stdout_json(&lenient);
    assert_eq!(json["stats"]["warnings"].as_array().unwrap().len(), 2);
    assert_eq!(json["stats"]["overfull_boxes"][0]["amount"], 15.2);
    assert_eq!(json["stats"]["overfull_boxes"][0]["lines"], "10--12");
    assert_eq!(json["stats"]["pages"], 2);

    let strict = project.run(&["--json", "analyze", "resume.log", "--strict"]);
    assert!(!strict.status.success());
    let json = stdout_json(&strict);
    assert_eq!(json["failure"]["reason"], "warnings");
    assert_eq!(json["failure"]["count"], 4);
}

#[test]
fn test_missing_log_is_an_error() {
    let project = TestProject::new();

    let output = project.run(&["analyze", "missing.log"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to read log file"), "stderr: {stderr}");
}
