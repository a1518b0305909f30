use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

const ENV: &[(&str, &str)] = &[
    ("JWT_SECRET", "a-very-long-cli-test-secret"),
    ("JWT_ISSUER_ID", "cli-test-issuer-id"),
    ("JWT_CONTEXT_KEY", "jwtdata"),
    ("ADMIN_PASSWORD", "Sup3r-Secret!"),
];

fn cloudk8s() -> Command {
    let mut cmd = Command::cargo_bin("cloudk8s").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn prints_version() {
    cloudk8s()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn hashes_password() {
    cloudk8s()
        .args(["hash-password", "secret"])
        .assert()
        .success()
        .stdout("2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b\n");
}

#[test]
fn issued_token_verifies() {
    let output = cloudk8s().envs(ENV.iter().copied()).arg("issue-token").output().unwrap();
    assert!(output.status.success());
    let token = String::from_utf8(output.stdout).unwrap();
    assert_eq!(token.trim().split('.').count(), 3);

    cloudk8s()
        .envs(ENV.iter().copied())
        .args(["verify-token", token.trim()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"login\": \"goadmin\""))
        .stdout(predicate::str::contains("\"sub\": \"cloudk8s_server\""));
}

#[test]
fn token_for_another_secret_is_rejected() {
    let output = cloudk8s().envs(ENV.iter().copied()).arg("issue-token").output().unwrap();
    let token = String::from_utf8(output.stdout).unwrap();

    cloudk8s()
        .envs(ENV.iter().copied())
        .env("JWT_SECRET", "another-long-cli-test-secret")
        .args(["verify-token", token.trim()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("signature"));
}

#[test]
fn missing_configuration_fails() {
    cloudk8s()
        .arg("issue-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET"));
}

#[test]
fn reads_env_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for (key, value) in ENV {
        writeln!(file, "{key}={value}").unwrap();
    }

    cloudk8s()
        .args(["issue-token", "--env-file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[\w-]+\.[\w-]+\.[\w-]+\n$").unwrap());
}
