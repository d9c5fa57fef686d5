use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("flagchain-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn flagchain() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flagchain"))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
}

#[test]
fn help_works() {
    let out = flagchain()
        .arg("--help")
        .output()
        .expect("failed to run flagchain --help");
    assert_success(&out, "flagchain --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("expand") && stdout.contains("env"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn expand_prints_one_argument_per_line() {
    let dir = make_temp_dir("expand");
    let config = dir.join("deploy.conf");
    fs::write(
        &config,
        "# deploy defaults\n-env prod\n-load \"file with spaces.txt\" # trailing\n",
    )
    .expect("failed to write config");

    let out = flagchain()
        .arg("expand")
        .arg(&config)
        .output()
        .expect("failed to run flagchain expand");
    assert_success(&out, "flagchain expand");
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "-env\nprod\n-load\nfile with spaces.txt\n"
    );

    let out = flagchain()
        .arg("expand")
        .arg(&config)
        .arg("--json")
        .output()
        .expect("failed to run flagchain expand --json");
    assert_success(&out, "flagchain expand --json");
    let parsed: Vec<String> =
        serde_json::from_slice(&out.stdout).expect("expand --json did not print a JSON array");
    assert_eq!(parsed, ["-env", "prod", "-load", "file with spaces.txt"]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn expand_reports_unbalanced_quotes() {
    let dir = make_temp_dir("expand-bad");
    let config = dir.join("bad.conf");
    fs::write(&config, "-a 1\n-b \"open\n").expect("failed to write config");

    let out = flagchain()
        .arg("expand")
        .arg(&config)
        .output()
        .expect("failed to run flagchain expand");
    assert!(!out.status.success(), "expand of a bad file should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unbalanced quoting"), "stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn env_layers_files_in_order() {
    let dir = make_temp_dir("env-layers");
    let base = dir.join("base.env");
    let local = dir.join("local.env");
    fs::write(&base, "REGION=eu-west-1\nNAME=base\n").expect("failed to write base.env");
    fs::write(&local, "# local overrides\nNAME=local\n").expect("failed to write local.env");

    let out = flagchain()
        .args(["env", "-f"])
        .arg(&base)
        .arg("-f")
        .arg(&local)
        .output()
        .expect("failed to run flagchain env");
    assert_success(&out, "flagchain env");
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "NAME=local\nREGION=eu-west-1\n"
    );

    let out = flagchain()
        .args(["env", "--json", "--set", "NAME=cli", "-f"])
        .arg(&base)
        .arg("NAME")
        .output()
        .expect("failed to run flagchain env --json");
    assert_success(&out, "flagchain env --json");
    let parsed: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("env --json did not print JSON");
    assert_eq!(parsed, serde_json::json!({ "NAME": ["cli"] }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn env_reads_the_process_environment() {
    let out = flagchain()
        .args(["env", "--system", "FLAGCHAIN_INTEG_VALUE"])
        .env("FLAGCHAIN_INTEG_VALUE", "hello")
        .output()
        .expect("failed to run flagchain env --system");
    assert_success(&out, "flagchain env --system");
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "FLAGCHAIN_INTEG_VALUE=hello\n"
    );
}

#[test]
fn env_fails_on_missing_key() {
    let dir = make_temp_dir("env-missing");
    let file = dir.join("only.env");
    fs::write(&file, "PRESENT=1\n").expect("failed to write only.env");

    let out = flagchain()
        .args(["env", "-f"])
        .arg(&file)
        .arg("ABSENT")
        .output()
        .expect("failed to run flagchain env");
    assert!(!out.status.success(), "missing key should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("ABSENT is not set"), "stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn env_files_are_verbatim_unless_dotenv() {
    let dir = make_temp_dir("env-dotenv");
    let file = dir.join("app.env");
    fs::write(&file, "GREETING=\"hello world\" # note\nBROKEN=\"open\n")
        .expect("failed to write app.env");

    let out = flagchain()
        .args(["env", "-f"])
        .arg(&file)
        .output()
        .expect("failed to run flagchain env");
    assert_success(&out, "flagchain env");
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "BROKEN=\"open\nGREETING=\"hello world\" # note\n"
    );

    let out = flagchain()
        .args(["env", "--dotenv", "-f"])
        .arg(&file)
        .output()
        .expect("failed to run flagchain env --dotenv");
    assert!(!out.status.success(), "malformed dotenv file should fail");

    let out = flagchain()
        .args(["env", "--set", "=oops"])
        .output()
        .expect("failed to run flagchain env --set");
    assert!(!out.status.success(), "empty override key should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing key"), "stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}
