//! End-to-end deploy tests through the real binary.
//!
//! Everything here runs with `--dry-run`: the full local pipeline executes
//! (resolution, validation, descriptor, bundle) and no network call is made.

mod common;

use common::TestEnv;

const FULL_VAR_FILE: &str = "image-name: acme/web\n\
application-name: my-app\n\
env-name: my-app-dev\n\
bucket-name: deploys\n\
version-label: v7\n";

#[test]
fn dry_run_with_var_file_prints_plan() {
    let env = TestEnv::new();
    env.write_project_file("dockerrun.yml", FULL_VAR_FILE);

    let result = env.run(&["deploy", "--dry-run"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("Creating source bundle..."));
    assert!(result.stdout.contains("Would upload"));
    assert!(result.stdout.contains("s3://deploys/v7"));
    assert!(result
        .stdout
        .contains("Would create version 'v7' of application 'my-app'"));
    assert!(result
        .stdout
        .contains("Would deploy version 'v7' to environment 'my-app-dev'"));
}

#[test]
fn flag_overrides_var_file_value_in_built_descriptor() {
    let env = TestEnv::new();
    env.write_project_file(
        "dockerrun.yml",
        &format!("{FULL_VAR_FILE}tag-name: my-tag\ndest: out\n"),
    );

    let result = env.run(&["deploy", "--dry-run", "--tag-name", "my-new-tag"]);
    assert!(result.success, "stderr: {}", result.stderr);

    // the dest copy lets us inspect exactly what would have shipped
    let bundle = std::fs::File::open(env.project_path("out/app_source.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(bundle).unwrap();
    let mut descriptor = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("Dockerrun.aws.json").unwrap(),
        &mut descriptor,
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&descriptor).unwrap();
    assert_eq!(value["Image"]["Name"], "acme/web:my-new-tag");
}

#[test]
fn missing_application_name_fails_with_required_option() {
    let env = TestEnv::new();
    env.write_project_file(
        "dockerrun.yml",
        "image-name: acme/web\nbucket-name: deploys\nenv-name: my-app-dev\n",
    );

    let result = env.run(&["deploy", "--dry-run"]);
    assert!(!result.success);
    assert_ne!(result.exit_code, 0);
    assert!(
        result
            .stderr
            .contains("the required option 'application-name' was not provided"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn auth_bucket_name_without_key_fails() {
    let env = TestEnv::new();
    env.write_project_file(
        "dockerrun.yml",
        &format!("{FULL_VAR_FILE}auth-bucket-name: auth\n"),
    );

    let result = env.run(&["deploy", "--dry-run"]);
    assert!(!result.success);
    assert!(
        result
            .stderr
            .contains("option 'auth-bucket-name' also requires 'auth-bucket-key'"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn unknown_var_file_key_warns_but_deploys() {
    let env = TestEnv::new();
    env.write_project_file("dockerrun.yml", &format!("{FULL_VAR_FILE}tagname: v2\n"));

    let result = env.run(&["deploy", "--dry-run"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stderr.contains("Unknown option key 'tagname'"));
    assert!(result.stderr.contains("Did you mean 'tag-name'?"));
}

#[test]
fn malformed_var_file_fails() {
    let env = TestEnv::new();
    env.write_project_file("dockerrun.yml", "- one\n- two\n");

    let result = env.run(&["deploy", "--dry-run"]);
    assert!(!result.success);
    assert!(
        result.stderr.contains("malformed option file"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn missing_var_file_uses_overrides_only() {
    let env = TestEnv::new();

    let result = env.run(&[
        "deploy",
        "--dry-run",
        "-i",
        "acme/web",
        "-a",
        "my-app",
        "-e",
        "my-app-dev",
        "-b",
        "deploys",
    ]);
    assert!(result.success, "stderr: {}", result.stderr);
    // bucket key defaulted to the generated version label
    assert!(result.stdout.contains("Would upload"));
}

#[test]
fn explicit_var_file_path_is_respected() {
    let env = TestEnv::new();
    env.write_project_file("conf/deploy.yml", FULL_VAR_FILE);

    let result = env.run(&["deploy", "--dry-run", "-f", "conf/deploy.yml"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("s3://deploys/v7"));
}

#[test]
fn verbose_prints_options_file_and_digest() {
    let env = TestEnv::new();
    env.write_project_file("dockerrun.yml", FULL_VAR_FILE);

    let result = env.run(&["deploy", "--dry-run", "-v"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("Options file: "));
    assert!(result.stdout.contains("Bundle sha256: "));
}

#[test]
fn version_prints_package_version() {
    let env = TestEnv::new();

    let result = env.run(&["version"]);
    assert!(result.success);
    assert!(result
        .stdout
        .contains(&format!("dockerrun-deploy {}", env!("CARGO_PKG_VERSION"))));
}
