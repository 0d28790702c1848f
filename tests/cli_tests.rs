//! Integration tests for the CLI interface
//!
//! Every test runs in a temporary directory with an explicit config file so
//! nothing from the developer's machine leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MENU_JSON: &str = r#"[
  {"id": "A", "name": "Grilled Chicken Bowl", "category": "main", "pretax_price": 9.00, "dietary_tags": ["protein"]},
  {"id": "B", "name": "Roasted Vegetables", "category": "side", "pretax_price": 4.00, "dietary_tags": ["vegetarian"]},
  {"id": "C", "name": "Garden Salad", "category": "side", "pretax_price": "3.00", "dietary_tags": ["vegetarian"]},
  {"id": "D", "name": "Sparkling Water", "category": "extra", "pretax_price": 6.00}
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("relish.yml"), config).unwrap();
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("relishplus").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("RELISH_CONFIG")
            .env_remove("RELISH_EMAIL")
            .env_remove("RELISH_PASSWORD")
            .env_remove("RUST_LOG")
            .arg("-c")
            .arg(self.dir.path().join("relish.yml"));
        cmd
    }
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("relishplus").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_plan_lists_slots_and_urls() {
    let ws = Workspace::new("schedule:\n  days: 6\n");
    ws.cmd()
        .args(["plan", "--start", "2024-03-04", "--days", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 slot(s) over 2 day(s)"))
        .stdout(predicate::str::contains("Monday 03/04 lunch"))
        .stdout(predicate::str::contains("Tuesday 03/05 dinner"))
        .stdout(predicate::str::contains(
            "https://relish.ezcater.com/schedule/2024-03-05",
        ));
}

#[test]
fn test_plan_uses_configured_days_and_site() {
    let ws = Workspace::new("schedule:\n  days: 1\nsite:\n  base_url: https://staging.example.com\n");
    ws.cmd()
        .args(["plan", "--start", "2024-03-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 slot(s) over 1 day(s)"))
        .stdout(predicate::str::contains(
            "https://staging.example.com/schedule/2024-03-04",
        ));
}

#[test]
fn test_check_config_prints_profile() {
    let ws = Workspace::new(
        "dietary_preferences:\n  is_vegetarian: true\npreferred_cuisines: [thai]\n",
    );
    ws.cmd()
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Must be vegetarian"))
        .stdout(predicate::str::contains("Preferred cuisines: thai"))
        .stdout(predicate::str::contains("Budget: target $15.00, cap $18.00"));
}

#[test]
fn test_missing_config_file_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("relishplus")
        .unwrap()
        .current_dir(dir.path())
        .args(["-c", "missing.yml", "check-config"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_invalid_budget_exits_with_config_code() {
    let ws = Workspace::new("budget:\n  min_subsidy_target: 20\n  max_pretax_total: 18\n");
    ws.cmd().arg("check-config").assert().code(2);
}

#[test]
fn test_preview_selects_reference_cart() {
    let ws = Workspace::new("");
    let menu = ws.dir.path().join("menu.json");
    std::fs::write(&menu, MENU_JSON).unwrap();

    ws.cmd()
        .arg("preview")
        .arg("--menu")
        .arg(&menu)
        .assert()
        .success()
        .stdout(predicate::str::contains("Grilled Chicken Bowl"))
        .stdout(predicate::str::contains("Garden Salad"))
        .stdout(predicate::str::contains("Sparkling Water").not())
        .stdout(predicate::str::contains("Subtotal $16.00"));
}

#[test]
fn test_preview_with_nothing_eligible_fails() {
    let ws = Workspace::new("dietary_preferences:\n  is_vegan: true\n");
    let menu = ws.dir.path().join("menu.json");
    std::fs::write(&menu, MENU_JSON).unwrap();

    ws.cmd()
        .arg("preview")
        .arg("--menu")
        .arg(&menu)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Nothing on this menu fits (vegan)"));
}

#[test]
fn test_run_without_driver_is_config_error() {
    let ws = Workspace::new("");
    ws.cmd()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no browser driver configured"));
}

#[cfg(unix)]
#[test]
fn test_run_without_credentials_exits_before_ordering() {
    let ws = Workspace::new("");
    let driver = r#"sh -c 'while read line; do echo "{\"ok\":true}"; case "$line" in *close*) exit 0;; esac; done'"#;
    ws.cmd()
        .args(["run", "--driver", driver])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("RELISH_EMAIL"));
}
