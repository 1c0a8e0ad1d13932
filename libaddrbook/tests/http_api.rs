//! HTTP client against an in-process address service

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use libaddrbook::config::ApiConfig;
use libaddrbook::{
    AddrbookError, Address, AddressApi, AddressDraft, AddressStore, ApiError, HttpAddressApi,
    Operation,
};
use warp::http::StatusCode;
use warp::Filter;

type Db = Arc<Mutex<Vec<Address>>>;

fn draft(name: &str) -> AddressDraft {
    AddressDraft {
        name: name.to_string(),
        street: "1 Rd".to_string(),
        city: "X".to_string(),
        state: "Y".to_string(),
        zip: "0".to_string(),
    }
}

/// Bind `routes` on an ephemeral loopback port and return the origin
macro_rules! serve {
    ($routes:expr $(,)?) => {{
        let (addr, server): (SocketAddr, _) =
            warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{}", addr)
    }};
}

/// Minimal conforming address service; returns its origin
fn spawn_service(db: Db) -> String {
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
            warp::reply::with_status(warp::reply::json(&address), StatusCode::CREATED)
        });

    let delete = warp::path!("addresses" / i64)
        .and(warp::delete())
        .and(with_db)
        .map(|id: i64, db: Db| {
            let mut db = db.lock().unwrap();
            let before = db.len();
            db.retain(|a| a.id != id);
            let status = if db.len() == before {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::NO_CONTENT
            };
            warp::reply::with_status(warp::reply(), status)
        });

    serve!(list.or(create).or(delete))
}

fn client(origin: &str) -> HttpAddressApi {
    HttpAddressApi::new(&ApiConfig::with_base_url(origin)).unwrap()
}

#[tokio::test]
async fn test_list_create_delete_round_trip() {
    let db: Db = Arc::new(Mutex::new(Vec::new()));
    let origin = spawn_service(db.clone());
    let api = client(&origin);

    assert!(api.list().await.unwrap().is_empty());

    let created = api.create(&draft("Bo")).await.unwrap();
    assert_eq!(created.id, 1);
    assert!(created.matches_draft(&draft("Bo")));

    let listed = api.list().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    api.delete(created.id).await.unwrap();
    assert!(db.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let origin = spawn_service(Arc::new(Mutex::new(Vec::new())));
    let api = client(&origin);

    let err = api.delete(42).await.unwrap_err();
    assert!(matches!(err, AddrbookError::Api(ApiError::NotFound(42))));
}

#[tokio::test]
async fn test_trailing_slash_origin() {
    let origin = spawn_service(Arc::new(Mutex::new(Vec::new())));
    let api = client(&format!("{}/", origin));

    assert!(api.list().await.is_ok());
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let origin = serve!(warp::any().map(|| {
        warp::reply::with_status("database offline", StatusCode::INTERNAL_SERVER_ERROR)
    }));
    let api = client(&origin);

    let err = api.create(&draft("Bo")).await.unwrap_err();
    match err {
        AddrbookError::Api(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_reason_phrase() {
    let origin = serve!(
        warp::any().map(|| warp::reply::with_status(warp::reply(), StatusCode::BAD_GATEWAY)),
    );
    let api = client(&origin);

    let err = api.list().await.unwrap_err();
    assert_eq!(err.to_string(), "API error: Server returned 502: Bad Gateway");
}

#[tokio::test]
async fn test_malformed_body() {
    let origin = serve!(warp::any().map(|| "not json"));
    let api = client(&origin);

    let err = api.list().await.unwrap_err();
    assert!(matches!(err, AddrbookError::Api(ApiError::Malformed(_))));
}

#[tokio::test]
async fn test_store_over_http() {
    let db: Db = Arc::new(Mutex::new(vec![Address {
        id: 1,
        name: "Ann".to_string(),
        street: "5 Elm".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
    }]));
    let origin = spawn_service(db.clone());
    let store = AddressStore::from_config(&ApiConfig::with_base_url(&origin)).unwrap();

    assert_eq!(store.load().await.unwrap(), 1);
    let created = store.create(&draft("Bo")).await.unwrap();
    assert_eq!(created.id, 2);

    assert!(store.remove(99).await.unwrap_err().is_not_found());
    assert!(store.snapshot().error(Operation::Remove).is_some());

    store.remove(1).await.unwrap();
    let names: Vec<String> = store.addresses().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["Bo"]);
    assert_eq!(db.lock().unwrap().len(), 1);
    assert_eq!(store.endpoint(), origin);
}
