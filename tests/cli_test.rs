//! Integration tests for the crossplane-service binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SETTINGS_VARS: &[&str] = &[
    "ENV",
    "CONFIGURATION_SERVICE",
    "RESOURCE_DIR",
    "K_SINK",
    "WORK_DIR",
    "INSTALLER_VERSION",
    "KEPTN_API_PROTOCOL",
    "KEPTN_API_HOSTNAME",
    "KEPTN_API_TOKEN",
    "POLL_TIMEOUT_SECS",
];

fn service() -> Command {
    let mut cmd = Command::new(cargo_bin("crossplane-service"));
    for var in SETTINGS_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_event(dir: &TempDir, event_type: &str) -> std::path::PathBuf {
    let path = dir.path().join("event.json");
    let event = serde_json::json!({
        "specversion": "1.0",
        "id": "evt-cli",
        "source": "shipyard-controller",
        "type": event_type,
        "shkeptncontext": "ctx-cli",
        "data": {"project": "sockshop", "stage": "dev", "service": "carts"}
    });
    fs::write(&path, event.to_string()).unwrap();
    path
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    service()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provisions clusters with Crossplane"))
        .stdout(predicate::str::contains("render-values"));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    service().assert().failure();
    Ok(())
}

#[test]
fn handle_rejects_unknown_event() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let event = write_event(&temp, "sh.keptn.event.deployment.triggered");

    service()
        .arg("handle")
        .arg("--event")
        .arg(&event)
        .arg("--work-dir")
        .arg(temp.path().join("work"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Unhandled Keptn Cloud Event: sh.keptn.event.deployment.triggered",
        ));
    Ok(())
}

#[test]
fn handle_reads_event_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let event = write_event(&temp, "sh.keptn.event.unknown.triggered");

    service()
        .args(["handle", "--event", "-"])
        .write_stdin(fs::read_to_string(&event)?)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sh.keptn.event.unknown.triggered"));
    Ok(())
}

#[test]
fn handle_rejects_malformed_envelope() -> Result<(), Box<dyn std::error::Error>> {
    service()
        .arg("handle")
        .write_stdin("this is not json")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn handle_reports_missing_manifest_to_broker() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let event = write_event(&temp, "sh.keptn.event.environment-teardown.triggered");
    let broker = MockServer::start();
    let started = broker.mock(|when, then| {
        when.method(POST)
            .path("/event")
            .body_includes("sh.keptn.event.environment-teardown.started");
        then.status(200);
    });
    let finished = broker.mock(|when, then| {
        when.method(POST)
            .path("/event")
            .body_includes("sh.keptn.event.environment-teardown.finished")
            .body_includes("No crossplane/cluster.yaml file found for service carts");
        then.status(200);
    });

    service()
        .arg("handle")
        .arg("--event")
        .arg(&event)
        .env("ENV", "local")
        .env("RESOURCE_DIR", temp.path())
        .env("K_SINK", broker.url("/event"))
        .env("WORK_DIR", temp.path().join("work"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "sh.keptn.event.environment-teardown.triggered failed",
        ));

    started.assert();
    finished.assert();
    Ok(())
}

#[cfg(unix)]
fn write_stub(dir: &std::path::Path, name: &str, script: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn handle_masks_api_token_in_failed_install() -> Result<(), Box<dyn std::error::Error>> {
    const TOKEN: &str = "SUPERSECRETTOKEN123";

    let temp = TempDir::new()?;
    let event = write_event(&temp, "sh.keptn.event.environment-setup.triggered");
    let resources = temp.path().join("resources");
    fs::create_dir_all(resources.join("crossplane"))?;
    fs::write(
        resources.join("crossplane/cluster.yaml"),
        "apiVersion: compute.example.org/v1alpha1\nkind: Cluster\n",
    )?;

    let bin = temp.path().join("bin");
    fs::create_dir_all(&bin)?;
    let kubectl = write_stub(
        &bin,
        "kubectl",
        "#!/bin/sh\ncase \"$*\" in\n  *metadata.name*) echo \"'kubeconfig-keptn-crossplane'\" ;;\n  *data.kubeconfig*) ;;\n  *) echo ok ;;\nesac\n",
    );
    let helm = write_stub(
        &bin,
        "helm",
        &format!("#!/bin/sh\necho \"Error: token {} rejected\" >&2\nexit 1\n", TOKEN),
    );

    let templates = MockServer::start();
    templates.mock(|when, then| {
        when.method(GET).path("/values.yaml");
        then.status(200)
            .body("helmservice:\n  image:\n    tag: \"\"\nremoteControlPlane:\n  enabled: false\n");
    });
    let broker = MockServer::start();
    broker.mock(|when, then| {
        when.method(POST).path("/event");
        then.status(200);
    });

    let settings = temp.path().join("settings.yaml");
    fs::write(
        &settings,
        format!(
            "kubectl: {}\nhelm: {}\npoll:\n  initial_delay_secs: 0\n  interval_secs: 0\ninstaller:\n  values_template_url: {}\n",
            kubectl.display(),
            helm.display(),
            templates.url("/values.yaml")
        ),
    )?;

    let assert = service()
        .arg("--config")
        .arg(&settings)
        .arg("handle")
        .arg("--event")
        .arg(&event)
        .env("ENV", "local")
        .env("RESOURCE_DIR", &resources)
        .env("K_SINK", broker.url("/event"))
        .env("WORK_DIR", temp.path().join("work"))
        .env("KEPTN_API_HOSTNAME", "keptn.example.org")
        .env("KEPTN_API_TOKEN", TOKEN)
        .assert()
        .code(1);

    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("sh.keptn.event.environment-setup.triggered failed"));
    assert!(stdout.contains("Error: token [REDACTED] rejected"));
    assert!(!stdout.contains(TOKEN));
    assert!(!stderr.contains(TOKEN));
    Ok(())
}

#[test]
fn production_mode_requires_configuration_service() -> Result<(), Box<dyn std::error::Error>> {
    service()
        .args(["--env", "production", "handle"])
        .write_stdin("{}")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration service URL"));
    Ok(())
}

#[test]
fn render_values_writes_patched_template() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/values.yaml");
        then.status(200)
            .body("helmservice:\n  image:\n    tag: \"\"\nremoteControlPlane:\n  enabled: false\n");
    });

    let settings = temp.path().join("settings.yaml");
    fs::write(
        &settings,
        format!(
            "installer:\n  values_template_url: {}\nremote_control_plane:\n  hostname: keptn.example.org\n",
            server.url("/values.yaml")
        ),
    )?;
    let output = temp.path().join("values.yaml");

    service()
        .arg("--config")
        .arg(&settings)
        .args(["--installer-version", "0.8.1", "render-values", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Values written to"));

    let rendered = fs::read_to_string(&output)?;
    assert!(rendered.contains("0.8.1"));
    assert!(rendered.contains("keptn.example.org"));
    assert!(rendered.contains("enabled: true"));
    Ok(())
}

#[test]
fn render_values_prints_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/values.yaml");
        then.status(200).body("helmservice:\n  image:\n    tag: \"\"\n");
    });

    let settings = temp.path().join("settings.yaml");
    fs::write(
        &settings,
        format!(
            "installer:\n  values_template_url: {}\n",
            server.url("/values.yaml")
        ),
    )?;

    service()
        .arg("--config")
        .arg(&settings)
        .arg("--work-dir")
        .arg(temp.path())
        .arg("render-values")
        .assert()
        .success()
        .stdout(predicate::str::contains("remoteControlPlane:"))
        .stdout(predicate::str::contains("0.8.0"));
    Ok(())
}

#[test]
fn missing_settings_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    service()
        .args(["--config", "/nonexistent/settings.yaml", "render-values"])
        .assert()
        .code(1);
    Ok(())
}
