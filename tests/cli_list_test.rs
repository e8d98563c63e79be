//! Integration tests for `corvus list`.
//!
//! Seeds a local SQLite registry under an isolated home directory and checks
//! filtering and both output formats.

mod common;

use common::{SeedModel, TestEnv};
use predicates::prelude::*;

fn seed_default(env: &TestEnv) {
    env.seed_registry(&[
        SeedModel {
            name: "resnet",
            short_id: "a1b2",
            size: 1536,
            created: 1_700_000_000,
            branch: "main",
            sha: "0123456789abcdef",
            repo: Some(("acme", "vision")),
            parent: None,
        },
        SeedModel {
            name: "bert",
            short_id: "c3d4",
            size: 1023,
            created: 1_700_000_100,
            branch: "feature",
            sha: "fedcba9876543210",
            repo: None,
            parent: None,
        },
        SeedModel {
            name: "resnet-finetuned",
            short_id: "e5f6",
            size: 3 * 1024 * 1024,
            created: 1_700_000_200,
            branch: "main",
            sha: "1111111222222",
            repo: Some(("acme", "vision")),
            parent: Some("a1b2"),
        },
    ]);
}

fn list_json(env: &TestEnv, args: &[&str]) -> Vec<serde_json::Value> {
    let output = env.corvus().arg("list").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value.as_array().unwrap().clone()
}

fn names(models: &[serde_json::Value]) -> Vec<&str> {
    models
        .iter()
        .map(|m| m["model_name"].as_str().unwrap())
        .collect()
}

#[test]
fn test_list_table_default() {
    let env = TestEnv::new();
    seed_default(&env);

    env.corvus()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Model Name"))
        .stdout(predicate::str::contains("Short Model ID"))
        .stdout(predicate::str::contains("resnet"))
        .stdout(predicate::str::contains("acme\\vision"))
        .stdout(predicate::str::contains("No Remote VCS Configured"))
        .stdout(predicate::str::contains("0123456"))
        .stdout(predicate::str::contains("0123456789").not())
        .stdout(predicate::str::contains("1.5 KiB"))
        .stdout(predicate::str::contains("1023.0 B"))
        .stdout(predicate::str::contains("resnet-finetuned").not());
}

#[test]
fn test_list_json_after_set_format() {
    let env = TestEnv::new();
    seed_default(&env);
    env.corvus()
        .args(["set", "format", "JSON"])
        .assert()
        .success();

    let models = list_json(&env, &[]);

    assert_eq!(names(&models), vec!["bert", "resnet"]);
    let resnet = &models[1];
    assert_eq!(resnet["short_model_id"], "a1b2");
    assert_eq!(resnet["repository"], "acme\\vision");
    assert_eq!(resnet["branch"], "main");
    assert_eq!(resnet["git_sha"], "0123456");
    assert_eq!(resnet["size"], "1.5 KiB");
    assert!(resnet["creation_time"].as_str().unwrap().contains('/'));
}

#[test]
fn test_list_all_includes_children() {
    let env = TestEnv::new();
    seed_default(&env);
    env.write_config("output_format = \"JSON\"\n");

    let models = list_json(&env, &["--all"]);

    assert_eq!(names(&models), vec!["resnet-finetuned", "bert", "resnet"]);
}

#[test]
fn test_list_branch_without_repo_matches_any_repository() {
    let env = TestEnv::new();
    seed_default(&env);
    env.write_config("output_format = \"JSON\"\n");

    let models = list_json(&env, &["--branch", "feature"]);

    assert_eq!(names(&models), vec!["bert"]);
}

#[test]
fn test_list_repo_filter() {
    let env = TestEnv::new();
    seed_default(&env);
    env.write_config("output_format = \"JSON\"\n");

    let models = list_json(&env, &["--repo", "vision", "--all"]);

    assert_eq!(names(&models), vec!["resnet-finetuned", "resnet"]);
}

#[test]
fn test_list_branch_filter_matches_exactly() {
    let env = TestEnv::new();
    let model = |name, branch| SeedModel {
        name,
        short_id: name,
        size: 1,
        created: 1_700_000_000,
        branch,
        sha: "abcdef0123",
        repo: Some(("acme", "vision")),
        parent: None,
    };
    env.seed_registry(&[
        model("lower", "main"),
        model("upper", "MAIN"),
        model("dashed", "feature-1"),
    ]);
    env.write_config("output_format = \"JSON\"\n");

    assert_eq!(names(&list_json(&env, &["--branch", "main"])), vec!["lower"]);
    assert!(list_json(&env, &["--branch", "feature_1"]).is_empty());
    assert!(list_json(&env, &["--repo", "Vision"]).is_empty());
}

#[test]
fn test_list_registry_path_override() {
    let env = TestEnv::new();
    seed_default(&env);
    let moved = env.home().join("elsewhere.sqlite");
    std::fs::rename(env.default_registry_path(), &moved).unwrap();
    env.write_config("output_format = \"JSON\"\n");

    let output = env
        .corvus()
        .env("CORVUS_REGISTRY_PATH", &moved)
        .arg("list")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
}

#[test]
fn test_list_missing_registry_fails() {
    let env = TestEnv::new();

    env.corvus()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No local artefact registry found"));
}

#[test]
fn test_list_remote_without_api_key_prints_guidance() {
    let env = TestEnv::new();

    env.corvus()
        .args(["list", "--remote"])
        // Unroutable: any request attempt would fail the command.
        .env("CORVUS_REMOTE_URL", "http://127.0.0.1:1")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "API Key has not been set - please set via `corvus set api_key`",
        ));
}

#[test]
fn test_list_remote_with_unreachable_registry_fails() {
    let env = TestEnv::new();
    env.write_config("api_key = \"sk-test-key\"\n");

    env.corvus()
        .args(["list", "--remote"])
        .env("CORVUS_REMOTE_URL", "http://127.0.0.1:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Remote registry request failed"))
        .stderr(predicate::str::contains("sk-test-key").not());
}
