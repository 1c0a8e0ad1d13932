//! CLI integration tests
//!
//! Runs the `addr` binary against an in-process address service.

use std::fs;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use libaddrbook::{Address, AddressDraft};
use predicates::prelude::*;
use tempfile::TempDir;
use warp::http::StatusCode;
use warp::Filter;

type Db = Arc<Mutex<Vec<Address>>>;

/// Runtime serving a minimal address service; dropping it stops the server
struct TestService {
    _runtime: tokio::runtime::Runtime,
    origin: String,
    db: Db,
}

impl TestService {
    fn start(seed: Vec<Address>) -> Self {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let db: Db = Arc::new(Mutex::new(seed));

        let with_db = {
            let db = db.clone();
            warp::any().map(move || db.clone())
        };

        let list = warp::path("addresses")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_db.clone())
            .map(|db: Db| warp::reply::json(&*db.lock().unwrap()));

        let create = warp::path("addresses")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(with_db.clone())
            .map(|draft: AddressDraft, db: Db| {
                let mut db = db.lock().unwrap();
                let id = db.iter().map(|a| a.id).max().unwrap_or(0) + 1;
                let address = Address {
                    id,
                    name: draft.name,
                    street: draft.street,
                    city: draft.city,
                    state: draft.state,
                    zip: draft.zip,
                };
                db.push(address.clone());
                warp::reply::json(&address)
            });

        let delete = warp::path!("addresses" / i64)
            .and(warp::delete())
            .and(with_db)
            .map(|id: i64, db: Db| {
                let mut db = db.lock().unwrap();
                let before = db.len();
                db.retain(|a| a.id != id);
                if db.len() == before {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::NO_CONTENT
                }
            });

        let routes = list.or(create).or(delete);
        let addr: SocketAddr = runtime.block_on(async {
            let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
            tokio::spawn(server);
            addr
        });

        Self {
            _runtime: runtime,
            origin: format!("http://{}", addr),
            db,
        }
    }
}

fn ann() -> Address {
    Address {
        id: 1,
        name: "Ann".to_string(),
        street: "5 Elm".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
    }
}

/// `addr` isolated from the user's config
fn addr(origin: &str) -> (TempDir, Command) {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("addr").unwrap();
    cmd.env("ADDRBOOK_CONFIG", temp_dir.path().join("missing.toml"))
        .env_remove("ADDRBOOK_LOG_LEVEL")
        .env("ADDRBOOK_API_URL", origin);
    (temp_dir, cmd)
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("addr").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("remove"));
}

#[test]
fn test_list_text() {
    let service = TestService::start(vec![ann()]);
    let (_dir, mut cmd) = addr(&service.origin);

    cmd.arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Ann"))
        .stdout(predicate::str::contains("Springfield, IL 62701"));
}

#[test]
fn test_list_empty_prints_placeholder() {
    let service = TestService::start(vec![]);
    let (_dir, mut cmd) = addr(&service.origin);

    cmd.arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No addresses found"));
}

#[test]
fn test_list_json() {
    let service = TestService::start(vec![ann()]);
    let (_dir, mut cmd) = addr(&service.origin);

    let output = cmd.args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: Vec<Address> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, vec![ann()]);
}

#[test]
fn test_add_prints_created_record() {
    let service = TestService::start(vec![ann()]);
    let (_dir, mut cmd) = addr(&service.origin);

    cmd.args([
        "add", "--name", "Bo", "--street", "1 Rd", "--city", "X", "--state", "Y", "--zip", "0",
        "--format", "jsonl",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""id":2"#));

    assert_eq!(service.db.lock().unwrap().len(), 2);
}

#[test]
fn test_add_with_empty_field_is_invalid_input() {
    let service = TestService::start(vec![]);
    let (_dir, mut cmd) = addr(&service.origin);

    cmd.args([
        "add", "--name", "Bo", "--street", "1 Rd", "--city", "X", "--state", "Y", "--zip", "",
    ])
    .assert()
    .code(3)
    .stderr(predicate::str::contains("ZIP Code"));

    assert!(service.db.lock().unwrap().is_empty());
}

#[test]
fn test_remove_then_missing() {
    let service = TestService::start(vec![ann()]);

    let (_dir, mut cmd) = addr(&service.origin);
    cmd.args(["remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed address #1"));

    let (_dir, mut cmd) = addr(&service.origin);
    cmd.args(["remove", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Address 1 not found"));
}

#[test]
fn test_unreachable_service_exits_1() {
    let (_dir, mut cmd) = addr("http://127.0.0.1:9");

    cmd.arg("list").assert().code(1).stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_api_url_flag_overrides_env() {
    let service = TestService::start(vec![ann()]);
    let (_dir, mut cmd) = addr("http://127.0.0.1:9");

    cmd.args(["--api-url", &service.origin, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann"));
}

#[test]
fn test_config_file_with_bad_scheme_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[api]\nbase_url = \"ftp://example.com\"\n").unwrap();

    let mut cmd = Command::cargo_bin("addr").unwrap();
    cmd.env_remove("ADDRBOOK_API_URL")
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api.base_url"));
}
