use super::feed::encode_event;
use super::valid_segment;
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::{start_change_dispatcher, FeedState};
use actix_web::body::MessageBody;
use actix_web::http::{header, StatusCode};
use actix_web::{test as atest, web, App};
use common::requests::InsertResponse;
use common::store::StoredDocument;
use futures_util::future::poll_fn;
use serde_json::{json, Value};

const PARTITION_URL: &str = "/api/artifacts/app-1/public/data/equipment";

struct Fixture {
    _dir: tempfile::TempDir,
    db: Database,
    feeds: FeedState,
    identities: IdentityState,
    uid: String,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("docs.sqlite"));
    db.init_schema().unwrap();

    let (feeds, rx) = FeedState::new(32);
    tokio::spawn(start_change_dispatcher(feeds.clone(), rx));

    let identities = IdentityState::new(Vec::new());
    let uid = identities.sign_in(None).await.uid;
    Fixture {
        _dir: dir,
        db,
        feeds,
        identities,
        uid,
    }
}

macro_rules! app {
    ($fx:expr) => {
        atest::init_service(
            App::new()
                .app_data(web::Data::new($fx.db.clone()))
                .app_data(web::Data::new($fx.feeds.clone()))
                .app_data(web::Data::new($fx.identities.clone()))
                .configure(crate::services::configure),
        )
        .await
    };
}

fn bearer(uid: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", uid))
}

fn laptop() -> Value {
    json!({ "nombre": "Laptop Dell XPS", "tipo": "Laptop", "sede": "Sede Lima", "sku": "EQP001" })
}

#[actix_web::test]
async fn insert_then_list_returns_the_document_with_its_id() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::post()
        .uri(PARTITION_URL)
        .insert_header(bearer(&fx.uid))
        .set_json(laptop())
        .to_request();
    let inserted: InsertResponse = atest::call_and_read_body_json(&app, req).await;
    assert!(!inserted.id.is_empty());

    let req = atest::TestRequest::get()
        .uri(PARTITION_URL)
        .insert_header(bearer(&fx.uid))
        .to_request();
    let documents: Vec<StoredDocument> = atest::call_and_read_body_json(&app, req).await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, inserted.id);
    assert_eq!(documents[0].fields.get("sku"), Some(&json!("EQP001")));
}

#[actix_web::test]
async fn client_supplied_id_is_ignored_on_insert() {
    let fx = fixture().await;
    let app = app!(fx);

    let mut body = laptop();
    body["id"] = json!("chosen-by-client");
    let req = atest::TestRequest::post()
        .uri(PARTITION_URL)
        .insert_header(bearer(&fx.uid))
        .set_json(body)
        .to_request();
    let inserted: InsertResponse = atest::call_and_read_body_json(&app, req).await;

    assert_ne!(inserted.id, "chosen-by-client");
    let stored = fx.db.snapshot("artifacts/app-1/public/data/equipment").unwrap();
    assert!(!stored[0].fields.contains_key("id"));
}

#[actix_web::test]
async fn update_overwrites_and_unknown_ids_are_not_found() {
    let fx = fixture().await;
    let app = app!(fx);
    let partition = "artifacts/app-1/public/data/equipment";
    let id = fx
        .db
        .insert(partition, laptop().as_object().unwrap())
        .unwrap();

    let req = atest::TestRequest::put()
        .uri(&format!("{}/{}", PARTITION_URL, id))
        .insert_header(bearer(&fx.uid))
        .set_json(json!({ "nombre": "Laptop Dell XPS 15" }))
        .to_request();
    assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::OK);
    let stored = fx.db.snapshot(partition).unwrap();
    assert_eq!(stored[0].fields.len(), 1);

    let req = atest::TestRequest::put()
        .uri(&format!("{}/missing", PARTITION_URL))
        .insert_header(bearer(&fx.uid))
        .set_json(laptop())
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn delete_succeeds_for_unknown_ids() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::delete()
        .uri(&format!("{}/never-existed", PARTITION_URL))
        .insert_header(bearer(&fx.uid))
        .to_request();
    assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn requests_without_a_known_identity_are_unauthorized() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::get().uri(PARTITION_URL).to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = atest::TestRequest::get()
        .uri(PARTITION_URL)
        .insert_header(bearer("made-up"))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = atest::TestRequest::get()
        .uri(&format!("{}/feed", PARTITION_URL))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn bad_segments_and_non_object_bodies_are_rejected() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::get()
        .uri("/api/artifacts/app.1/public/data/equipment")
        .insert_header(bearer(&fx.uid))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = atest::TestRequest::post()
        .uri(PARTITION_URL)
        .insert_header(bearer(&fx.uid))
        .set_json(json!(["not", "an", "object"]))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn sign_in_issues_identities_the_store_accepts() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::post()
        .uri("/api/identity/sign_in")
        .set_json(json!({ "token": null }))
        .to_request();
    let identity: common::store::StoreIdentity = atest::call_and_read_body_json(&app, req).await;
    assert!(identity.anonymous);

    let req = atest::TestRequest::get()
        .uri(PARTITION_URL)
        .insert_header(bearer(&identity.uid))
        .to_request();
    assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn feed_streams_initial_and_changed_snapshots() {
    let fx = fixture().await;
    let app = app!(fx);

    let req = atest::TestRequest::get()
        .uri(&format!("{}/feed?auth={}", PARTITION_URL, fx.uid))
        .to_request();
    let resp = atest::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut body = std::pin::pin!(resp.into_body());
    let first = poll_fn(|cx| body.as_mut().poll_next(cx))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&first[..], b"id: 0\ndata: []\n\n");

    let req = atest::TestRequest::post()
        .uri(PARTITION_URL)
        .insert_header(bearer(&fx.uid))
        .set_json(laptop())
        .to_request();
    let inserted: InsertResponse = atest::call_and_read_body_json(&app, req).await;

    let second = poll_fn(|cx| body.as_mut().poll_next(cx))
        .await
        .unwrap()
        .unwrap();
    let text = String::from_utf8(second.to_vec()).unwrap();
    assert!(text.starts_with("id: 1\ndata: "));
    assert!(text.contains(&inserted.id));
}

#[test]
fn events_are_single_line_json() {
    let documents = vec![StoredDocument {
        id: "a1".to_string(),
        fields: laptop().as_object().unwrap().clone(),
    }];
    let bytes = encode_event(7, &documents).unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();

    let data = text
        .strip_prefix("id: 7\ndata: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .unwrap();
    assert!(!data.contains('\n'));
    let parsed: Vec<StoredDocument> = serde_json::from_str(data).unwrap();
    assert_eq!(parsed, documents);
}

#[test]
fn segments_allow_only_plain_identifiers() {
    assert!(valid_segment("default-app-id"));
    assert!(valid_segment("EQP_010"));
    assert!(!valid_segment(""));
    assert!(!valid_segment("a/b"));
    assert!(!valid_segment("../etc"));
}

#[actix_web::test]
async fn forgotten_identities_are_rejected_until_signed_in_again() {
    let mut fx = fixture().await;
    let stale_uid = fx.uid.clone();
    // A restarted server starts with an empty registry.
    fx.identities = IdentityState::new(Vec::new());
    let app = app!(fx);

    let req = atest::TestRequest::get()
        .uri(PARTITION_URL)
        .insert_header(bearer(&stale_uid))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = atest::TestRequest::post()
        .uri("/api/identity/sign_in")
        .set_json(json!({ "token": null }))
        .to_request();
    let identity: common::store::StoreIdentity = atest::call_and_read_body_json(&app, req).await;
    let req = atest::TestRequest::get()
        .uri(PARTITION_URL)
        .insert_header(bearer(&identity.uid))
        .to_request();
    assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn feed_accepts_percent_encoded_provisioned_tokens() {
    let mut fx = fixture().await;
    fx.identities = IdentityState::new(vec!["a+b&c d#e".to_string()]);
    let app = app!(fx);

    let req = atest::TestRequest::get()
        .uri(&format!("{}/feed?auth=a%2Bb%26c%20d%23e", PARTITION_URL))
        .to_request();
    assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::OK);

    let req = atest::TestRequest::get()
        .uri(&format!("{}/feed?auth=a+b%26c+d%23e", PARTITION_URL))
        .to_request();
    assert_eq!(
        atest::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
