#![cfg(unix)]

use build_exec::{CapturingSink, CommandRunner, ConsoleMode, ExecError, ExecOptions, Redirect};
use std::collections::HashMap;

fn streaming() -> (CommandRunner, CapturingSink) {
    let sink = CapturingSink::new();
    (CommandRunner::new(sink.clone(), ConsoleMode::Plain), sink)
}

fn interactive() -> (CommandRunner, CapturingSink) {
    let sink = CapturingSink::new();
    (CommandRunner::new(sink.clone(), ConsoleMode::Rich), sink)
}

#[test]
fn echo_returns_trimmed_output() -> Result<(), ExecError> {
    for (runner, _) in [streaming(), interactive()] {
        let output = runner.execute(["echo", "hello"], ExecOptions::default())?;
        assert_eq!(output, "hello");
    }
    Ok(())
}

#[test]
fn false_fails_with_code_one() {
    for (runner, _) in [streaming(), interactive()] {
        let error = runner
            .execute(["false"], ExecOptions::default())
            .unwrap_err();
        assert_eq!(error.exit_code(), Some(1));
    }
}

#[test]
fn exit_code_is_preserved() {
    let (runner, _) = streaming();
    let error = runner
        .execute("echo partial; exit 42", ExecOptions::shell())
        .unwrap_err();
    let failure = error.failure().expect("expected an execution failure");
    assert_eq!(failure.code(), 42);
    assert_eq!(failure.output(), "partial\n");
}

#[test]
fn signalled_child_reports_negative_code() {
    let (runner, _) = streaming();
    let error = runner
        .execute("kill -9 $$", ExecOptions::shell())
        .unwrap_err();
    assert_eq!(error.exit_code(), Some(-9));
}

#[test]
fn running_twice_gives_identical_output() -> Result<(), ExecError> {
    let (runner, _) = streaming();
    let first = runner.execute(["printf", "a\\nb\\n"], ExecOptions::default())?;
    let second = runner.execute(["printf", "a\\nb\\n"], ExecOptions::default())?;
    assert_eq!(first, second);
    assert_eq!(first, "a\nb");
    Ok(())
}

#[test]
fn streaming_logs_combined_output_in_order() -> Result<(), ExecError> {
    let (runner, sink) = streaming();
    let output = runner.execute(
        "echo one; echo two 1>&2; echo three",
        ExecOptions::shell(),
    )?;
    assert_eq!(output, "one\ntwo\nthree");
    assert_eq!(
        sink.lines(),
        vec!["[exec] echo one; echo two 1>&2; echo three", "one", "two", "three"]
    );
    Ok(())
}

#[test]
fn interactive_failure_logs_captured_output() {
    let (runner, sink) = interactive();
    runner
        .execute("echo '\x1b[31mfailed\x1b[0m'; exit 3", ExecOptions::shell())
        .unwrap_err();
    assert_eq!(sink.lines().len(), 2);
    assert_eq!(sink.lines()[1], "\x1b[31mfailed\x1b[0m\n");
}

#[test]
fn interactive_stderr_is_not_captured() -> Result<(), ExecError> {
    let (runner, _) = interactive();
    let output = runner.execute(
        "echo out; echo err 1>&2",
        ExecOptions::shell().with_stderr(Redirect::Null),
    )?;
    assert_eq!(output, "out");
    Ok(())
}

#[test]
fn no_output_is_empty_string() -> Result<(), ExecError> {
    for (runner, _) in [streaming(), interactive()] {
        assert_eq!(runner.execute(["true"], ExecOptions::default())?, "");
    }
    Ok(())
}

#[test]
fn run_with_env_uses_given_environment() -> Result<(), ExecError> {
    let (runner, _) = streaming();
    let env = HashMap::from([("FOO".to_string(), "bar".to_string())]);
    let output = runner.run_with_env(env, ["sh", "-c", "echo $FOO"], ExecOptions::default())?;
    assert_eq!(output, "bar");
    Ok(())
}

#[test]
fn run_with_env_overrides_ambient_value() -> Result<(), ExecError> {
    std::env::set_var("BUILD_EXEC_AMBIENT", "ambient");
    let (runner, _) = streaming();
    let env = HashMap::from([
        ("BUILD_EXEC_AMBIENT".to_string(), "supplied".to_string()),
        ("PATH".to_string(), std::env::var("PATH").unwrap_or_default()),
    ]);
    let output = runner.run_shell_with_env(
        env,
        "echo $BUILD_EXEC_AMBIENT; echo ${HOME:-unset}",
        ExecOptions::default(),
    )?;
    assert_eq!(output, "supplied\nunset");
    Ok(())
}

#[test]
fn interactive_run_with_env_does_not_capture() -> Result<(), ExecError> {
    let (runner, _) = interactive();
    let env = HashMap::from([("FOO".to_string(), "bar".to_string())]);
    let output = runner.run_with_env(env, ["sh", "-c", "echo $FOO"], ExecOptions::default())?;
    assert_eq!(output, "");
    Ok(())
}

#[test]
fn stdin_bytes_are_fed_to_the_command() -> Result<(), ExecError> {
    let (runner, _) = streaming();
    let output = runner.execute(["cat"], ExecOptions::default().with_stdin("piped in\n"))?;
    assert_eq!(output, "piped in");
    Ok(())
}

#[test]
fn working_dir_is_respected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "")?;
    let (runner, _) = interactive();
    let output = runner.execute(["ls"], ExecOptions::default().with_working_dir(dir.path()))?;
    assert_eq!(output, "marker.txt");
    Ok(())
}

#[test]
fn interactive_stdout_redirect_writes_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let log = dir.path().join("out.log");
    let (runner, _) = interactive();
    let output = runner.execute(
        ["echo", "to file"],
        ExecOptions::default().with_stdout(Redirect::file(&log, false)),
    )?;
    assert_eq!(output, "");
    assert_eq!(std::fs::read_to_string(&log)?, "to file\n");
    Ok(())
}

#[test]
fn streaming_ignores_stdout_redirect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let log = dir.path().join("out.log");
    let (runner, _) = streaming();
    let output = runner.execute(
        ["echo", "captured"],
        ExecOptions::default().with_stdout(Redirect::file(&log, false)),
    )?;
    assert_eq!(output, "captured");
    assert!(!log.exists());
    Ok(())
}

#[test]
fn missing_executable_is_a_spawn_error() {
    let (runner, _) = streaming();
    let error = runner
        .execute(["please-dont-exist"], ExecOptions::default())
        .unwrap_err();
    assert!(matches!(error, ExecError::Spawn { .. }));
}

#[test]
fn runner_can_be_shared_between_threads() {
    let (runner, sink) = streaming();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let runner = runner.clone();
            std::thread::spawn(move || {
                runner.execute(["echo", i.to_string().as_str()], ExecOptions::default())
            })
        })
        .collect();
    let mut outputs: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    outputs.sort();
    assert_eq!(outputs, vec!["0", "1", "2", "3"]);
    assert_eq!(sink.lines().len(), 8);
}

#[test]
fn run_with_env_never_uses_the_shell() {
    let (runner, sink) = streaming();
    let env = HashMap::from([
        ("FOO".to_string(), "bar".to_string()),
        ("PATH".to_string(), std::env::var("PATH").unwrap_or_default()),
    ]);
    let error = runner
        .run_with_env(env, "echo $FOO", ExecOptions::shell())
        .unwrap_err();
    assert!(
        matches!(error, ExecError::Spawn { ref program, .. } if program == "echo $FOO"),
        "expected {:?} to be started as a program, got {error:?}",
        "echo $FOO"
    );
    assert!(!sink.contents().contains("bar"));
}

#[test]
fn string_without_shell_flag_is_not_expanded() {
    let (runner, _) = interactive();
    let error = runner
        .execute("echo $HOME", ExecOptions::default().with_shell(false))
        .unwrap_err();
    assert!(matches!(error, ExecError::Spawn { .. }));

    let output = runner
        .execute("echo $BUILD_EXEC_UNSET_VAR done", ExecOptions::shell())
        .unwrap();
    assert_eq!(output, "done");
}
