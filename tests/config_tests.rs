//! Configuration loading tests

use std::io::Write;

use rhye::prelude::*;
use rhye::telemetry;
use tempfile::NamedTempFile;

const YAML: &str = r#"
backend:
  apiKey: file-key
  authDomain: file.example.com
  projectId: file-project
  storageBucket: file-project.appspot.com
  messagingSenderId: "7"
  appId: "1:7:web:file"
routes:
  protectedRoutes:
    - /admin
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_temp(YAML);
    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.backend.project_id, "file-project");
    assert!(config.backend.measurement_id.is_none());

    let guard = RouteGuard::from_config(&config.routes);
    assert!(guard.is_protected("/admin/users"));
    assert!(!guard.is_protected("/game"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = AppConfig::from_yaml_file("/nonexistent/rhye.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/rhye.yaml"));
}

#[test]
fn test_missing_project_id_rejected() {
    let yaml = YAML.replace("  projectId: file-project\n", "");
    let file = write_temp(&yaml);
    assert!(AppConfig::from_yaml_file(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_empty_key_rejected() {
    let yaml = YAML.replace("apiKey: file-key", "apiKey: \"\"");
    match AppConfig::from_yaml_str(&yaml) {
        Err(ConfigError::MissingKey { key }) => assert_eq!(key, "apiKey"),
        other => panic!("expected MissingKey, got {other:?}"),
    }
}

#[test]
fn test_debug_redacts_api_key() {
    let config = AppConfig::from_yaml_str(YAML).unwrap();
    let debug = format!("{:?}", config.backend);
    assert!(!debug.contains("file-key"));
    assert!(debug.contains("file-project"));
}

#[tokio::test]
async fn test_in_memory_client_from_file_config() {
    telemetry::init_tracing();

    let file = write_temp(YAML);
    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
    let client = BackendClient::in_memory(&config.backend);

    let created = client.documents().create("items", &json!({"name": "x"})).await;
    assert!(created.is_success());
}
