use assert_cmd::Command;
use predicates::prelude::*;

/// Port 9 (discard) refuses connections on test machines.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn medassist() -> Command {
    let mut cmd = Command::cargo_bin("medassist").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("MEDASSIST_API_URL");
    cmd
}

#[test]
fn test_cli_help() {
    medassist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Medication cost-assistance"));
}

#[test]
fn test_cli_serve_help() {
    medassist()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port").and(predicate::str::contains("fixtures")));
}

#[test]
fn test_migrate_requires_database_url() {
    medassist().arg("migrate").assert().failure().stderr(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_strategy_offline_prints_empty_shape() {
    medassist()
        .args(["--api-url", UNREACHABLE, "strategy", "tacrolimus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strategy\": null"));
}

#[test]
fn test_strategy_rejects_unknown_insurance() {
    medassist()
        .args(["strategy", "tacrolimus", "--insurance", "platinum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown insurance type"));
}

#[test]
fn test_offline_report_then_prices() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("reports.json");

    medassist()
        .env("MEDASSIST_LOCAL_STORE", &store)
        .args(["--api-url", UNREACHABLE, "report", "tacrolimus", "costco", "49.99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stored_locally\": true"));

    medassist()
        .env("MEDASSIST_LOCAL_STORE", &store)
        .args(["--api-url", UNREACHABLE, "prices", "tacrolimus", "costco"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"avg\": \"49.99\""));

    medassist()
        .env("MEDASSIST_LOCAL_STORE", &store)
        .args(["--api-url", UNREACHABLE, "price-stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tacrolimus_costco"));
}
