#![allow(dead_code)]

use axum::Extension;
use axum_test::TestServer;
use link_shortener::application::services::{IdentityService, LinkService};
use link_shortener::domain::delete_pipeline::DeletePipeline;
use link_shortener::domain::entities::{BatchItem, Owner};
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::error::StoreError;
use link_shortener::infrastructure::Store;
use link_shortener::infrastructure::persistence::MemoryLinkRepository;
use link_shortener::routes::{owner_routes, public_routes};
use link_shortener::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://sho.rt";
pub const SIGNING_SECRET: &str = "test-signing-secret";

/// Builds application state over `store` with two delete lanes.
pub fn create_test_state(store: Store) -> (AppState, DeletePipeline) {
    let store = Arc::new(store);
    let (queue, pipeline) = DeletePipeline::spawn(store.clone(), 2);

    let link_service = Arc::new(LinkService::new(
        store.clone(),
        queue,
        BASE_URL,
        Duration::from_secs(5),
    ));
    let identity = Arc::new(IdentityService::new(SIGNING_SECRET));

    (AppState::new(link_service, store, identity), pipeline)
}

pub fn memory_state() -> (AppState, DeletePipeline) {
    create_test_state(Store::Memory(MemoryLinkRepository::new()))
}

/// Test server where every request is made as `owner`.
pub fn server_as(state: AppState, owner: &str) -> TestServer {
    let app = public_routes()
        .merge(owner_routes())
        .with_state(state)
        .layer(Extension(Owner::from(owner)));

    TestServer::new(app).unwrap()
}

/// Strips the base URL from a returned short URL.
pub fn code_of(short_url: &str) -> String {
    short_url
        .strip_prefix(&format!("{BASE_URL}/"))
        .unwrap_or_else(|| panic!("unexpected short url {short_url}"))
        .to_string()
}

/// Drives a full link lifecycle through a repository.
///
/// Every backend must pass this unchanged, apart from the values of minted
/// codes. Expects an empty store.
pub async fn lifecycle_scenario<R: LinkRepository + ?Sized>(repo: &R) {
    let u1 = Owner::from("u1");
    let u2 = Owner::from("u2");

    let first = repo.save(&u1, "http://a.test").await.unwrap();
    assert!(first.created);
    assert_eq!(first.code.as_str().len(), 16);

    let again = repo.save(&u1, "http://a.test").await.unwrap();
    assert!(!again.created);
    assert_eq!(again.code, first.code);
    assert_eq!(repo.get(&first.code).await.unwrap(), "http://a.test");

    let other = repo.save(&u2, "http://a.test").await.unwrap();
    assert!(other.created);
    assert_ne!(other.code, first.code);

    let batch = repo
        .save_batch(
            &u1,
            vec![
                BatchItem::new("1", "http://a.test"),
                BatchItem::new("2", "http://b.test"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].correlation_id, "2");
    assert_eq!(repo.get(&batch[0].code).await.unwrap(), "http://b.test");

    let links = repo.links_by_owner(&u1).await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links.get(&first.code).map(String::as_str), Some("http://a.test"));

    // Someone else's code is left alone.
    let changed = repo
        .soft_delete(&u2, std::slice::from_ref(&first.code))
        .await
        .unwrap();
    assert_eq!(changed, 0);
    assert_eq!(repo.get(&first.code).await.unwrap(), "http://a.test");

    let changed = repo
        .soft_delete(&u1, std::slice::from_ref(&first.code))
        .await
        .unwrap();
    assert_eq!(changed, 1);
    assert!(matches!(repo.get(&first.code).await, Err(StoreError::Gone(_))));

    let changed = repo
        .soft_delete(&u1, std::slice::from_ref(&first.code))
        .await
        .unwrap();
    assert_eq!(changed, 0);

    let links = repo.links_by_owner(&u1).await.unwrap();
    assert_eq!(links.len(), 1);
    assert!(!links.contains_key(&first.code));

    let deleted_again = repo.save(&u1, "http://a.test").await.unwrap();
    assert!(!deleted_again.created);
    assert_eq!(deleted_again.code, first.code);

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.owners, 2);
    assert_eq!(stats.links, 3);

    let unknown = "ffffffffffffffff".parse().unwrap();
    assert!(matches!(
        repo.get(&unknown).await,
        Err(StoreError::NotFound(_))
    ));
}
