#[path = "../src/api_client.rs"]
#[allow(dead_code)] // Some methods are used by the binary but not by tests
mod api_client;

use api_client::ApiClient;
use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::MockServer;
use serde_json::json;
use std::net::TcpListener;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn write_upload(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"fake image bytes").unwrap();
    path
}

#[tokio::test]
async fn api_client_image_paths() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let temp = tempfile::tempdir().unwrap();
    let upload = write_upload(&temp, "cat.png");

    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .json_body(json!({ "status": "ok", "version": "0.1.0" }));
    });

    let info_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/getimageinfo/")
            .body_contains("filename=\"cat.png\"");
        then.status(200)
            .json_body(json!({ "filename": "cat.png", "width": 64, "height": 48 }));
    });

    let mark_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/putmarkonimage/")
            .body_contains("name=\"x\"")
            .body_contains("-7");
        then.status(200).json_body(json!({
            "filename": "cat_marked.png",
            "message": "Image marked and saved successfully.",
            "url": "http://127.0.0.1:8000/marked_images/cat_marked.png"
        }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/images");
        then.status(200).json_body(json!({
            "images": ["http://127.0.0.1:8000/marked_images/cat_marked.png"]
        }));
    });

    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/images/cat_marked.png");
        then.status(200)
            .json_body(json!({ "message": "Image cat_marked.png deleted successfully" }));
    });

    let client = ApiClient::new(&server.base_url()).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, "0.1.0");

    let info = client.image_info(&upload).await.unwrap();
    assert_eq!(info.filename, "cat.png");
    assert_eq!((info.width, info.height), (64, 48));
    info_mock.assert();

    let marked = client.mark(&upload, -7, 12).await.unwrap();
    assert_eq!(marked.filename, "cat_marked.png");
    assert_eq!(marked.message, "Image marked and saved successfully.");
    assert!(marked.url.ends_with("/marked_images/cat_marked.png"));
    mark_mock.assert();

    let images = client.list_images().await.unwrap();
    assert_eq!(images.len(), 1);

    let deleted = client.delete_image("cat_marked.png").await.unwrap();
    assert_eq!(deleted.message, "Image cat_marked.png deleted successfully");
    delete_mock.assert();
}

#[tokio::test]
async fn api_client_record_paths() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let record = json!({ "id": 3, "filename": "cat_marked.png", "filepath": null });

    server.mock(|when, then| {
        when.method(POST).path("/db/images/init");
        then.status(200).json_body(json!({
            "message": "Initialization complete. Added 1 new images. 0 images were skipped (already in the database).",
            "added_images": [{ "id": 3, "filename": "cat_marked.png" }]
        }));
    });

    server.mock(|when, then| {
        when.method(POST).path("/db/populate");
        then.status(200).json_body(json!({
            "message": "Images populated from folder",
            "added_images": []
        }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/db/images");
        then.status(200).json_body(json!([
            record.clone(),
            { "id": 4, "filename": "dog.png", "filepath": "/data/marked_images/dog.png" }
        ]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/db/images/3");
        then.status(200).json_body(record.clone());
    });

    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/db/images")
            .json_body(json!({ "filename": "cat_marked.png" }));
        then.status(200).json_body(record.clone());
    });

    let update_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/db/images/3")
            .json_body(json!({ "filename": "renamed.png" }));
        then.status(200)
            .json_body(json!({ "id": 3, "filename": "renamed.png", "filepath": null }));
    });

    server.mock(|when, then| {
        when.method(DELETE).path("/db/images/3");
        then.status(200).json_body(record.clone());
    });

    let client = ApiClient::new(&server.base_url()).unwrap();

    let init = client.init_records().await.unwrap();
    assert_eq!(init.added_images.len(), 1);
    assert_eq!(init.added_images[0].id, 3);
    assert!(init.message.starts_with("Initialization complete."));

    let populated = client.populate_records().await.unwrap();
    assert_eq!(populated.message, "Images populated from folder");
    assert!(populated.added_images.is_empty());

    let records = client.list_records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[1].filepath.as_deref(),
        Some("/data/marked_images/dog.png")
    );

    let fetched = client.get_record(3).await.unwrap();
    assert_eq!(fetched.filename, "cat_marked.png");

    let created = client.create_record("cat_marked.png").await.unwrap();
    assert_eq!(created.id, 3);
    create_mock.assert();

    let updated = client.update_record(3, "renamed.png").await.unwrap();
    assert_eq!(updated.filename, "renamed.png");
    update_mock.assert();

    let deleted = client.delete_record(3).await.unwrap();
    assert_eq!(deleted.id, 3);

    let found = client.find_record("dog.png").await.unwrap();
    assert_eq!(found.map(|r| r.id), Some(4));
    assert!(client.find_record("missing.png").await.unwrap().is_none());
}

#[tokio::test]
async fn api_client_reports_error_detail() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/db/images/9");
        then.status(404)
            .json_body(json!({ "code": "not_found", "detail": "Image not found" }));
    });

    server.mock(|when, then| {
        when.method(POST).path("/db/images");
        then.status(400).json_body(json!({
            "code": "duplicate",
            "detail": "Image with this filename already exists."
        }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/images");
        then.status(502).body("bad gateway");
    });

    let client = ApiClient::new(&server.base_url()).unwrap();

    let err = client.get_record(9).await.unwrap_err().to_string();
    assert!(err.contains("404"), "{err}");
    assert!(err.contains("Image not found (not_found)"), "{err}");

    let err = client.create_record("cat.png").await.unwrap_err().to_string();
    assert!(err.contains("already exists"), "{err}");

    let err = client.list_images().await.unwrap_err().to_string();
    assert!(err.contains("bad gateway"), "{err}");
}

#[tokio::test]
async fn api_client_keeps_base_path_prefix() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/pinmark/health");
        then.status(200)
            .json_body(json!({ "status": "ok", "version": "0.1.0" }));
    });
    let record_mock = server.mock(|when, then| {
        when.method(GET).path("/pinmark/db/images/3");
        then.status(200)
            .json_body(json!({ "id": 3, "filename": "cat.png", "filepath": null }));
    });

    for base in [server.url("/pinmark"), server.url("/pinmark/")] {
        let client = ApiClient::new(&base).unwrap();
        assert_eq!(client.health().await.unwrap().status, "ok");
        assert_eq!(client.get_record(3).await.unwrap().filename, "cat.png");
    }

    health_mock.assert_hits(2);
    record_mock.assert_hits(2);
}

#[tokio::test]
async fn api_client_rejects_missing_upload() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client
        .image_info(std::path::Path::new("/nonexistent/cat.png"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn api_client_rejects_invalid_url() {
    assert!(ApiClient::new("not a url").is_err());
}
