#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CD_SYNTAX: &str = "cd: Syntax error! Wrong number of arguments!\n";
const PWD_SYNTAX: &str = "pwd: Syntax error! Wrong number of arguments!\n";

fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn pipesh(dir: &Path, line: &str) -> Command {
    let mut cmd = Command::cargo_bin("pipesh").unwrap();
    cmd.current_dir(dir)
        .env("PIPESH_LOG_DIR", dir.join(".logs"))
        .env("PIPESH_HISTORY", dir.join(".history"))
        .arg("-c")
        .arg(line);
    cmd
}

fn real_path(dir: &Path) -> String {
    dir.canonicalize().unwrap().display().to_string()
}

#[test]
fn test_semicolon_runs_every_command() {
    let dir = workdir();
    pipesh(dir.path(), "echo a ; false ; echo b")
        .assert()
        .success()
        .stdout("a\nb\n");
    pipesh(dir.path(), "echo a ; false").assert().code(1).stdout("a\n");
}

#[test]
fn test_and_runs_right_side_only_after_success() {
    let dir = workdir();
    pipesh(dir.path(), "true && echo yes")
        .assert()
        .success()
        .stdout("yes\n");
    pipesh(dir.path(), "false && echo no")
        .assert()
        .code(1)
        .stdout("");
    // A failed AND ends the whole list, not just the next command.
    pipesh(dir.path(), "sh -c 'exit 3' && echo no ; echo after")
        .assert()
        .code(3)
        .stdout("");
}

#[test]
fn test_or_runs_right_side_only_after_failure() {
    let dir = workdir();
    pipesh(dir.path(), "false || echo yes")
        .assert()
        .success()
        .stdout("yes\n");
    pipesh(dir.path(), "true || echo no")
        .assert()
        .success()
        .stdout("");
    pipesh(dir.path(), "false || sh -c 'exit 4'").assert().code(4);
}

#[test]
fn test_pipeline_connects_stdout_to_stdin() {
    let dir = workdir();
    pipesh(dir.path(), "printf 'a\\nc\\nb\\n' | sort | head -n 2")
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn test_pipeline_preserves_bytes() {
    let dir = workdir();
    // Larger than a pipe buffer, so the stages have to run concurrently.
    let data: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(dir.path().join("data.bin"), &data).unwrap();

    pipesh(dir.path(), "cat data.bin | cat | cat > copy.bin")
        .assert()
        .success();
    assert_eq!(fs::read(dir.path().join("copy.bin")).unwrap(), data);
}

#[test]
fn test_pipeline_status_is_last_stage() {
    let dir = workdir();
    pipesh(dir.path(), "true | false").assert().code(1);
    pipesh(dir.path(), "false | true").assert().success();
}

#[test]
fn test_producer_dies_quietly_when_reader_exits() {
    let dir = workdir();
    pipesh(dir.path(), "yes | head -n 1")
        .assert()
        .success()
        .stdout("y\n")
        .stderr("");
}

#[cfg(target_os = "linux")]
#[test]
fn test_children_start_with_default_sigpipe() {
    let dir = workdir();
    // SIGPIPE (13) is bit 12 of the ignored-signal mask.
    pipesh(dir.path(), "grep SigIgn /proc/self/status > mask.txt")
        .assert()
        .success();
    let line = fs::read_to_string(dir.path().join("mask.txt")).unwrap();
    let mask = u64::from_str_radix(line.trim().trim_start_matches("SigIgn:").trim(), 16).unwrap();
    assert_eq!(mask & (1 << 12), 0);
}

#[test]
fn test_cd_changes_directory_for_later_commands() {
    let dir = workdir();
    let target = dir.path().join("sub");
    fs::create_dir(&target).unwrap();

    pipesh(dir.path(), "cd sub ; our_pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", real_path(&target))));
    pipesh(dir.path(), "cd sub && ls")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_cd_to_tmp() {
    let dir = workdir();
    pipesh(dir.path(), "cd /tmp ; our_pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", real_path(Path::new("/tmp")))));
}

#[test]
fn test_cd_wrong_argument_count() {
    let dir = workdir();
    pipesh(dir.path(), "cd").assert().code(1).stderr(CD_SYNTAX);
    pipesh(dir.path(), "cd a b").assert().code(1).stderr(CD_SYNTAX);
    pipesh(dir.path(), "cd a b ; our_pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", real_path(dir.path()))));
}

#[test]
fn test_cd_missing_directory() {
    let dir = workdir();
    pipesh(dir.path(), "cd /nonexistent-pipesh-dir || echo failed")
        .assert()
        .success()
        .stdout("failed\n")
        .stderr("cd: No such file or directory\n");
}

#[test]
fn test_our_pwd() {
    let dir = workdir();
    pipesh(dir.path(), "our_pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", real_path(dir.path()))));
    pipesh(dir.path(), "our_pwd extra")
        .assert()
        .code(1)
        .stdout("")
        .stderr(PWD_SYNTAX);
}

#[test]
fn test_builtin_output_can_be_piped() {
    let dir = workdir();
    pipesh(dir.path(), "our_pwd | cat")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", real_path(dir.path()))));
}

#[test]
fn test_exit_codes() {
    let dir = workdir();
    pipesh(dir.path(), "exit 7").assert().code(7);
    pipesh(dir.path(), "exit").assert().code(0);
    pipesh(dir.path(), "exit abc").assert().code(0);
    pipesh(dir.path(), "false ; exit").assert().code(0);
}

#[test]
fn test_exit_stops_the_rest_of_the_list() {
    let dir = workdir();
    pipesh(dir.path(), "echo before ; exit 3 ; echo after")
        .assert()
        .code(3)
        .stdout("before\n");
    pipesh(dir.path(), "exit 4 | cat ; echo after")
        .assert()
        .code(4)
        .stdout("");
}

#[test]
fn test_exit_with_two_arguments_does_not_exit() {
    let dir = workdir();
    pipesh(dir.path(), "exit 1 2 ; echo still here")
        .assert()
        .success()
        .stdout("still here\n")
        .stderr("exit: Syntax error! Wrong number of arguments!\n");
}

#[test]
fn test_subshell_status_is_zero_or_five() {
    let dir = workdir();
    pipesh(dir.path(), "(false)").assert().code(5);
    pipesh(dir.path(), "(true)").assert().success();
    pipesh(dir.path(), "(true ; sh -c 'exit 9')").assert().code(5);
    pipesh(dir.path(), "(false) || echo recovered")
        .assert()
        .success()
        .stdout("recovered\n");
}

#[test]
fn test_subshell_exit_ends_only_the_subshell() {
    let dir = workdir();
    pipesh(dir.path(), "(exit 3) ; echo after")
        .assert()
        .success()
        .stdout("after\n");
    pipesh(dir.path(), "(exit 3)").assert().code(3);
}

#[test]
fn test_subshell_cd_does_not_leak() {
    let dir = workdir();
    pipesh(dir.path(), "(cd / ; our_pwd) ; our_pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("/\n{}\n", real_path(dir.path()))));
}

#[test]
fn test_subshell_redirection_covers_the_body() {
    let dir = workdir();
    pipesh(dir.path(), "(echo one ; echo two) > both.txt")
        .assert()
        .success()
        .stdout("");
    assert_eq!(
        fs::read_to_string(dir.path().join("both.txt")).unwrap(),
        "one\ntwo\n"
    );
}

#[test]
fn test_redirect_builtin_output_creates_empty_file() {
    let dir = workdir();
    pipesh(dir.path(), "cd /tmp > out.txt").assert().success();
    assert_eq!(fs::read(dir.path().join("out.txt")).unwrap(), b"");
}

#[test]
fn test_redirect_builtin_errors() {
    let dir = workdir();
    pipesh(dir.path(), "cd /nonexistent-pipesh-dir 2> err.txt")
        .assert()
        .code(1)
        .stderr("");
    let err = fs::read_to_string(dir.path().join("err.txt")).unwrap();
    assert_eq!(err, "cd: No such file or directory\n");

    pipesh(dir.path(), "our_pwd extra 2> err.txt")
        .assert()
        .code(1)
        .stderr("");
    assert_eq!(
        fs::read_to_string(dir.path().join("err.txt")).unwrap(),
        PWD_SYNTAX
    );
}

#[test]
fn test_output_redirect_truncates() {
    let dir = workdir();
    fs::write(dir.path().join("out.txt"), "old contents that are long\n").unwrap();
    pipesh(dir.path(), "echo new > out.txt").assert().success();
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "new\n"
    );
}

#[test]
fn test_input_redirect() {
    let dir = workdir();
    fs::write(dir.path().join("in.txt"), "b\na\n").unwrap();
    pipesh(dir.path(), "sort < in.txt")
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn test_input_redirect_overrides_pipe() {
    let dir = workdir();
    fs::write(dir.path().join("in.txt"), "from file\n").unwrap();
    pipesh(dir.path(), "echo from pipe | cat < in.txt")
        .assert()
        .success()
        .stdout("from file\n");
}

#[test]
fn test_missing_input_file() {
    let dir = workdir();
    pipesh(dir.path(), "cat < missing.txt || echo handled")
        .assert()
        .success()
        .stdout("handled\n")
        .stderr("missing.txt: No such file or directory\n");
}

#[test]
fn test_null_command_with_redirect_creates_file() {
    let dir = workdir();
    pipesh(dir.path(), "> empty.txt").assert().success();
    assert!(dir.path().join("empty.txt").exists());
}

#[test]
fn test_unknown_program() {
    let dir = workdir();
    pipesh(dir.path(), "no-such-program-pipesh arg")
        .assert()
        .code(1)
        .stderr("no-such-program-pipesh: No such file or directory\n");
}

#[test]
fn test_signal_folds_to_one() {
    let dir = workdir();
    pipesh(dir.path(), "sh -c 'kill -9 $$'").assert().code(1);
}

#[test]
fn test_background_does_not_block() {
    let dir = workdir();
    pipesh(dir.path(), "false &").assert().success();
    pipesh(dir.path(), "sleep 5 > /dev/null 2> /dev/null & echo now")
        .timeout(std::time::Duration::from_secs(4))
        .assert()
        .success()
        .stdout("now\n");
}

#[test]
fn test_syntax_error_runs_nothing() {
    let dir = workdir();
    pipesh(dir.path(), "echo a &&")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::starts_with("pipesh: syntax error:"));
    pipesh(dir.path(), "(echo a").assert().code(2).stdout("");
    pipesh(dir.path(), "echo \"abc")
        .assert()
        .code(2)
        .stdout("")
        .stderr("pipesh: syntax error: unterminated \" quote\n");
}

#[test]
fn test_quoted_arguments_reach_program_unchanged() {
    let dir = workdir();
    pipesh(dir.path(), "printf '%s|' 'a b' \"c;d\" e")
        .assert()
        .success()
        .stdout("a b|c;d|e|");
}

#[cfg(target_os = "linux")]
#[test]
fn test_no_descriptor_leak() {
    let dir = workdir();
    let line = "ls /proc/self/fd > before.txt ; \
                echo x | cat | cat > /dev/null ; \
                (true | true) ; \
                cat < missing.txt 2> /dev/null ; \
                sleep 0 & \
                cd . > /dev/null && our_pwd > /dev/null ; \
                ls /proc/self/fd > after.txt";
    pipesh(dir.path(), line).assert().success();

    let before = fs::read_to_string(dir.path().join("before.txt")).unwrap();
    let after = fs::read_to_string(dir.path().join("after.txt")).unwrap();
    assert!(!before.is_empty());
    assert_eq!(before, after);
}

#[test]
fn test_script_file() {
    let dir = workdir();
    fs::write(
        dir.path().join("script.sh"),
        "# comment\necho one\n\nfalse || echo two\nexit 6\necho never\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("pipesh").unwrap();
    cmd.current_dir(dir.path())
        .env("PIPESH_LOG_DIR", dir.path().join(".logs"))
        .arg("script.sh")
        .assert()
        .code(6)
        .stdout("one\ntwo\n");
}
