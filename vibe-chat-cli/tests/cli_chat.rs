use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const ENV_OVERRIDES: &[&str] = &[
    "VIBE_CHAT_HISTORY_FILE",
    "VIBE_CHAT_MAX_TURNS",
    "VIBE_CHAT_MEMORY",
    "RUST_LOG",
    "LOG_FORMAT",
];

/// Run the binary inside `dir` with `input` piped to stdin
fn run(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_vibe-chat"));
    command
        .arg("--config-dir")
        .arg(dir.join("config"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for name in ENV_OVERRIDES {
        command.env_remove(name);
    }

    let mut child = command.spawn().expect("spawn vibe-chat");
    // The process may exit before reading stdin
    let _ = child.stdin.take().expect("stdin").write_all(input.as_bytes());
    child.wait_with_output().expect("wait for vibe-chat")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_document(path: &Path) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_chat_with_memory_persists_exchange() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();

    let output = run(
        temp_dir.path(),
        &[
            "--memory",
            "--history-file",
            &history_arg,
            "--personality",
            "plain",
            "--generator",
            "echo",
            "chat",
        ],
        "hello\nquit\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(&format!("Memory: on ({})", history_arg)));
    assert!(out.contains("plain: hello"));
    assert!(out.contains("Bye!"));

    let document = read_document(&history);
    assert_eq!(document.len(), 2);
    assert_eq!(document[0]["speaker"], "user");
    assert_eq!(document[0]["text"], "hello");
    assert_eq!(document[1]["speaker"], "bot");
    assert_eq!(document[1]["text"], "hello");
}

#[test]
fn test_chat_records_raw_user_text() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();

    let output = run(
        temp_dir.path(),
        &[
            "--memory",
            "--history-file",
            &history_arg,
            "--personality",
            "plain",
            "--generator",
            "echo",
        ],
        "  hello there  \n/history\n  QUIT \n",
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Session started"));
    assert!(out.contains("Bye!"));

    let document = read_document(&history);
    assert_eq!(document.len(), 2);
    assert_eq!(document[0]["text"], "  hello there  ");
}

#[test]
fn test_memory_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();
    let args = [
        "--memory",
        "--history-file",
        history_arg.as_str(),
        "--personality",
        "plain",
        "--generator",
        "echo",
    ];

    run(temp_dir.path(), &args, "first\nexit\n");
    let output = run(temp_dir.path(), &args, "/history\nquit\n");
    assert!(output.status.success());
    assert!(stdout(&output).contains("plain: first"));

    let history_output = run(
        temp_dir.path(),
        &[&args[..], &["history"][..]].concat(),
        "",
    );
    assert!(stdout(&history_output).contains("You: first"));
}

#[test]
fn test_chat_without_memory_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        temp_dir.path(),
        &["--generator", "echo"],
        "hello\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Memory: off"));
    assert!(!temp_dir.path().join("conversation_history.json").exists());
}

#[test]
fn test_max_turns_keeps_latest_pair() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();

    let output = run(
        temp_dir.path(),
        &[
            "--memory",
            "--history-file",
            &history_arg,
            "--max-turns",
            "2",
            "--personality",
            "plain",
            "--generator",
            "echo",
        ],
        "hello\njoke\nweather\nquit\n",
    );

    assert!(output.status.success());
    let document = read_document(&history);
    assert_eq!(document.len(), 2);
    assert_eq!(document[0]["text"], "weather");
    assert_eq!(document[1]["text"], "weather");
}

#[test]
fn test_clear_command_empties_document() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();

    run(
        temp_dir.path(),
        &["--memory", "--history-file", &history_arg, "--generator", "echo"],
        "hello\nquit\n",
    );
    assert_eq!(read_document(&history).len(), 2);

    let output = run(temp_dir.path(), &["--history-file", &history_arg, "clear"], "");
    assert!(output.status.success());
    assert!(read_document(&history).is_empty());
}

#[test]
fn test_ask_prints_reply() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        temp_dir.path(),
        &["--personality", "sarcastic", "--generator", "echo", "ask", "--message", "hi"],
        "",
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "Sure, because that was super hard: Obviously, the user said: hi. Make it sound clever. 🙃"
    );
}

#[test]
fn test_blank_input_gets_fallback() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["--generator", "echo"], "   \nquit\n");

    assert!(output.status.success());
    assert!(stdout(&output).contains("Say something fun, I'm listening 😉"));
}

#[test]
fn test_status_reports_memory() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["--memory", "status"], "");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Persistence: on"));
    assert!(out.contains("conversation_history.json"));
    assert!(out.contains("Stored turns: 0"));
}

#[test]
fn test_invalid_options_abort_startup() {
    let temp_dir = TempDir::new().unwrap();

    let traversal = run(
        temp_dir.path(),
        &["--memory", "--history-file", "../escape.json"],
        "quit\n",
    );
    assert!(!traversal.status.success());

    let zero = run(temp_dir.path(), &["--max-turns", "0"], "quit\n");
    assert!(!zero.status.success());

    let unknown = run(temp_dir.path(), &["--personality", "grumpy"], "quit\n");
    assert!(!unknown.status.success());
    assert!(stderr(&unknown).contains("grumpy"));
}

#[test]
fn test_injected_startup_failure() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["chat", "--inject-error", "startup"], "");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Injected startup failure"));
}

#[test]
fn test_injected_provider_failure_keeps_repl_alive() {
    let temp_dir = TempDir::new().unwrap();
    let history = temp_dir.path().join("chat.json");
    let history_arg = history.to_string_lossy().into_owned();

    let output = run(
        temp_dir.path(),
        &[
            "--memory",
            "--history-file",
            &history_arg,
            "chat",
            "--inject-error",
            "provider",
        ],
        "hello\nquit\n",
    );

    assert!(output.status.success());
    assert!(stderr(&output).contains("Injected provider failure in generate"));
    assert!(stdout(&output).contains("Bye!"));
    assert!(read_document(&history).is_empty());
}

#[test]
fn test_injected_response_failure_aborts() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        temp_dir.path(),
        &["--generator", "echo", "chat", "--inject-error", "response"],
        "hello\nquit\n",
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Injected response failure after generation"));
    assert!(!stdout(&output).contains("Bye!"));
}
