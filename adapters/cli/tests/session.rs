use std::{
    io::Write,
    process::{Command, Stdio},
};

fn run(args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch the skirmish binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to feed stdin");
    child.wait_with_output().expect("skirmish did not finish")
}

#[test]
fn scripted_session_quits_cleanly() {
    let output = run(&["--seed", "3", "--script", " dq"], "");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("turn 0: ready"), "missing initial board:\n{stdout}");
    assert!(stdout.contains("turn 3: ready"), "missing final board:\n{stdout}");
    assert_eq!(stdout.matches("+--------------------------------------+").count(), 4);
}

#[test]
fn stdin_lines_are_played_until_quit() {
    let output = run(&["--width", "12", "--height", "8", "--cover", "0"], "x\n q\nw\n");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("turn 1: unknown command"));
    assert!(stdout.contains("turn 3: ready"));
    assert!(!stdout.contains("turn 4"), "input after quit was played:\n{stdout}");
}

#[test]
fn undersized_terminal_is_refused() {
    let output = run(&["--width", "3", "--height", "4"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("cannot fit a board in 3x4"), "stderr:\n{stderr}");
}
