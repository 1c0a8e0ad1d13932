//! Store behaviour against the in-memory address service

use std::sync::Arc;
use std::time::Duration;

use libaddrbook::api::MockAddressApi;
use libaddrbook::service::events::Event;
use libaddrbook::store::LoadState;
use libaddrbook::{
    AddrbookError, Address, AddressApi, AddressDraft, AddressField, AddressForm, AddressStore,
    ApiError, Operation, RemoveOutcome, RowStatus,
};

fn draft(name: &str) -> AddressDraft {
    AddressDraft {
        name: name.to_string(),
        street: "1 Rd".to_string(),
        city: "X".to_string(),
        state: "Y".to_string(),
        zip: "0".to_string(),
    }
}

fn address(id: i64, name: &str) -> Address {
    Address {
        id,
        name: name.to_string(),
        street: "5 Elm".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
    }
}

fn store_with(api: &MockAddressApi) -> AddressStore {
    AddressStore::new(Arc::new(api.clone()))
}

fn names(store: &AddressStore) -> Vec<String> {
    store.addresses().into_iter().map(|a| a.name).collect()
}

#[tokio::test]
async fn test_load_mirrors_server_order() {
    let api = MockAddressApi::with_addresses(vec![address(3, "Cy"), address(1, "Ann")]);
    let store = store_with(&api);

    store.load().await.unwrap();

    let ids: Vec<i64> = store.addresses().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn test_empty_server_shows_placeholder() {
    let api = MockAddressApi::new();
    let store = store_with(&api);

    assert_eq!(store.load().await.unwrap(), 0);

    let snapshot = store.snapshot();
    assert!(snapshot.shows_placeholder());
    assert_eq!(
        libaddrbook::list::view(&snapshot),
        libaddrbook::ListView::Empty
    );
}

#[tokio::test]
async fn test_load_twice_over_unchanged_server_is_idempotent() {
    let api =
        MockAddressApi::with_addresses(vec![address(3, "Cy"), address(1, "Ann"), address(2, "Bo")]);
    let store = store_with(&api);

    store.load().await.unwrap();
    let first = store.snapshot();
    store.load().await.unwrap();

    assert_eq!(store.snapshot(), first);
    assert_eq!(names(&store), vec!["Cy", "Ann", "Bo"]);
}

#[tokio::test]
async fn test_reload_replaces_not_merges() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann"), address(2, "Bo")]);
    let store = store_with(&api);
    store.load().await.unwrap();

    // Deleted by another client
    api.delete(1).await.unwrap();
    store.load().await.unwrap();

    assert_eq!(names(&store), vec!["Bo"]);
    assert_eq!(api.list_calls(), 2);
}

#[tokio::test]
async fn test_create_appends_server_record() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")]);
    let store = store_with(&api);
    store.load().await.unwrap();

    let created = store.create(&draft("Bo")).await.unwrap();

    assert_eq!(created.id, 2);
    assert!(created.matches_draft(&draft("Bo")));
    assert_eq!(names(&store), vec!["Ann", "Bo"]);
    assert!(store.snapshot().errors().is_empty());
}

#[tokio::test]
async fn test_create_failure_leaves_collection_and_records_error() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")]);
    let store = store_with(&api);
    store.load().await.unwrap();
    api.set_create_failure(Some(ApiError::Status {
        status: 500,
        message: "database offline".to_string(),
    }));
    let before = store.snapshot().entries().to_vec();

    let err = store.create(&draft("Bo")).await.unwrap_err();

    assert_eq!(err.exit_code(), 1);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.entries(), before.as_slice());
    let failure = snapshot.error(Operation::Create).unwrap();
    assert!(failure.message.contains("database offline"));
    assert!(snapshot.error(Operation::Load).is_none());
}

#[tokio::test]
async fn test_remove_drops_only_that_id() {
    let api = MockAddressApi::with_addresses(vec![
        address(1, "Ann"),
        address(2, "Bo"),
        address(3, "Cy"),
    ]);
    let store = store_with(&api);
    store.load().await.unwrap();

    assert_eq!(store.remove(2).await.unwrap(), RemoveOutcome::Removed);

    assert_eq!(names(&store), vec!["Ann", "Cy"]);
    assert_eq!(api.delete_calls(), vec![2]);
}

#[tokio::test]
async fn test_remove_unknown_id_records_not_found() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")]);
    let store = store_with(&api);
    store.load().await.unwrap();

    let err = store.remove(42).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(names(&store), vec!["Ann"]);
    let failure = store.snapshot().error(Operation::Remove).cloned().unwrap();
    assert_eq!(failure.address_id, Some(42));
}

#[tokio::test]
async fn test_remove_of_id_missing_locally_is_still_sent() {
    let api = MockAddressApi::with_addresses(vec![address(5, "Eve")]);
    let store = store_with(&api);

    assert_eq!(store.remove(5).await.unwrap(), RemoveOutcome::Removed);
    assert_eq!(api.delete_calls(), vec![5]);
    assert!(api.addresses().is_empty());
}

#[tokio::test]
async fn test_duplicate_remove_while_pending_sends_one_request() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")])
        .with_delay(Duration::from_millis(50));
    let store = store_with(&api);
    store.load().await.unwrap();

    let (first, second) = tokio::join!(store.remove(1), store.remove(1));

    assert_eq!(first.unwrap(), RemoveOutcome::Removed);
    assert_eq!(second.unwrap(), RemoveOutcome::AlreadyPending);
    assert_eq!(api.delete_calls(), vec![1]);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_concurrent_creates_both_land_in_order() {
    let api = MockAddressApi::new().with_delay(Duration::from_millis(20));
    let store = store_with(&api);

    let (ann, bo) = (draft("Ann"), draft("Bo"));
    let (a, b) = tokio::join!(store.create(&ann), store.create(&bo));

    assert_eq!(a.unwrap().id, 1);
    assert_eq!(b.unwrap().id, 2);
    assert_eq!(names(&store), vec!["Ann", "Bo"]);
}

#[tokio::test]
async fn test_many_concurrent_creates_lose_nothing() {
    let api = MockAddressApi::new().with_delay(Duration::from_millis(5));
    let store = store_with(&api);

    let drafts: Vec<AddressDraft> = (0..8).map(|i| draft(&format!("Person {}", i))).collect();
    let results = futures::future::join_all(drafts.iter().map(|d| store.create(d))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(store.addresses(), api.addresses());
    assert_eq!(store.snapshot().len(), 8);
}

#[tokio::test]
async fn test_load_and_create_are_serialized() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")])
        .with_delay(Duration::from_millis(30));
    let store = store_with(&api);

    let bo = draft("Bo");
    let (loaded, created) = tokio::join!(store.load(), store.create(&bo));

    assert_eq!(loaded.unwrap(), 1);
    let created = created.unwrap();
    assert_eq!(names(&store), vec!["Ann", "Bo"]);
    assert!(store.snapshot().contains(created.id));
}

#[tokio::test]
async fn test_reload_keeps_row_pending_while_remove_queued() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann"), address(2, "Bo")])
        .with_delay(Duration::from_millis(100));
    let store = store_with(&api);
    store.load().await.unwrap();
    let mut events = store.subscribe();

    let loader = store.clone();
    let load = tokio::spawn(async move { loader.load().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let remover = store.clone();
    let remove = tokio::spawn(async move { remover.remove(1).await });

    loop {
        if let Event::Loaded { .. } = events.recv().await.unwrap() {
            break;
        }
    }
    assert_eq!(store.snapshot().status(1), Some(RowStatus::Pending));
    assert_eq!(store.snapshot().status(2), Some(RowStatus::Present));

    load.await.unwrap().unwrap();
    assert_eq!(remove.await.unwrap().unwrap(), RemoveOutcome::Removed);
    assert_eq!(names(&store), vec!["Bo"]);
}

#[tokio::test]
async fn test_close_during_remove_reverts_pending() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")])
        .with_delay(Duration::from_millis(200));
    let store = store_with(&api);
    store.load().await.unwrap();

    let remover = store.clone();
    let handle = tokio::spawn(async move { remover.remove(1).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.snapshot().status(1), Some(RowStatus::Pending));
    store.close();

    assert!(matches!(handle.await.unwrap(), Err(AddrbookError::Cancelled)));
    assert_eq!(store.snapshot().status(1), Some(RowStatus::Present));
}

#[tokio::test]
async fn test_close_abandons_in_flight_create() {
    let api = MockAddressApi::new().with_delay(Duration::from_millis(200));
    let store = store_with(&api);

    let creator = store.clone();
    let handle = tokio::spawn(async move { creator.create(&draft("Bo")).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.close();

    let result = tokio::time::timeout(Duration::from_millis(100), handle)
        .await
        .expect("cancel should not wait for the request")
        .unwrap();

    assert!(matches!(result, Err(AddrbookError::Cancelled)));
    assert!(store.snapshot().is_empty());
    assert!(store.snapshot().errors().is_empty());
}

#[tokio::test]
async fn test_dropping_scope_cancels_load() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")])
        .with_delay(Duration::from_millis(200));
    let store = store_with(&api);
    let scope = store.scope();

    let loader = store.clone();
    let handle = tokio::spawn(async move { loader.load().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(scope);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(AddrbookError::Cancelled)));
    assert!(store.is_closed());
    assert!(store.snapshot().is_empty());
    assert_eq!(store.snapshot().load_state(), LoadState::NotLoaded);
}

#[tokio::test]
async fn test_close_during_reload_keeps_loaded_state() {
    let api = MockAddressApi::with_addresses(vec![address(1, "Ann")])
        .with_delay(Duration::from_millis(100));
    let store = store_with(&api);
    store.load().await.unwrap();
    let before = store.snapshot();

    api.insert(&draft("Bo"));
    let loader = store.clone();
    let handle = tokio::spawn(async move { loader.load().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.close();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(AddrbookError::Cancelled)));
    assert_eq!(store.snapshot().load_state(), LoadState::Loaded);
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_failure_events_carry_error() {
    let api = MockAddressApi::new();
    api.set_list_failure(Some(ApiError::Network("connection refused".to_string())));
    let store = store_with(&api);
    let mut events = store.subscribe();

    let _ = store.load().await;

    assert_eq!(events.recv().await.unwrap(), Event::LoadStarted);
    let failed = events.recv().await.unwrap();
    assert!(failed.is_terminal());
    assert!(failed.error().unwrap().contains("connection refused"));
    assert_eq!(store.snapshot().load_state(), LoadState::Failed);
}

#[tokio::test]
async fn test_form_round_trip_through_store() {
    let api = MockAddressApi::new();
    let store = store_with(&api);
    store.load().await.unwrap();
    let mut form = AddressForm::new();

    for field in AddressField::ALL {
        form.on_field_change(field, field.placeholder());
    }
    let created = form.submit(&store).await.unwrap();

    assert_eq!(created.name, "John Doe");
    assert_eq!(created.zip, "10001");
    assert!(form.draft().is_empty());
    assert_eq!(store.addresses(), vec![created]);
}

#[tokio::test]
async fn test_form_keeps_draft_when_store_closed() {
    let api = MockAddressApi::new().with_delay(Duration::from_millis(200));
    let store = store_with(&api);
    let mut form = AddressForm::new();
    for field in AddressField::ALL {
        form.on_field_change(field, "v");
    }

    let closer = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        closer.close();
    });
    let result = form.submit(&store).await;

    assert!(matches!(result, Err(AddrbookError::Cancelled)));
    assert!(form.is_complete());
    assert!(form.last_error().is_none());
}
