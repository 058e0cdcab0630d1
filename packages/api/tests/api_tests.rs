use std::fs;
use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use outline_splitter_api::{app, ApiConfig};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const BOUNDARY: &str = "outline-splitter-test-boundary";

const BOOK: &str = r#"
documents:
  intro: "Welcome to the book."
  ch1: "<p>First chapter.</p>"
  ch2: "Second chapter."
toc:
  - title: Intro
    href: intro
  - title: "Part 1: Basics"
    children:
      - title: Chapter 1
        href: ch1
      - title: Chapter 2
        href: ch2
"#;

enum Part<'a> {
    File { name: &'a str, content: &'a str },
    Text { name: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part<'_>]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match part {
            Part::File { name, content } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
                ));
            }
            Part::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn split_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/split")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Router whose scratch directories live under the returned temp dir.
fn test_app() -> (Router, TempDir) {
    let work = tempdir().unwrap();
    let router = app(ApiConfig::default().with_work_dir(work.path()));
    (router, work)
}

fn assert_work_dir_empty(work: &TempDir) {
    let leftovers: Vec<_> = fs::read_dir(work.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "scratch directory not cleaned up");
}

async fn error_message(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_split_returns_zip() {
    let (app, work) = test_app();

    let response = app
        .oneshot(split_request(&[
            Part::File {
                name: "my book.yaml",
                content: BOOK,
            },
            Part::Text {
                name: "level",
                value: "2",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/zip"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"my book_"));
    assert!(disposition.ends_with(".zip\""));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let mut archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "001_Intro.txt",
            "002_Part 1 Basics_Chapter 1.txt",
            "003_Part 1 Basics_Chapter 2.txt",
        ]
    );

    let mut chapter = String::new();
    archive
        .by_name("002_Part 1 Basics_Chapter 1.txt")
        .unwrap()
        .read_to_string(&mut chapter)
        .unwrap();
    assert_eq!(chapter, "Part 1: Basics > Chapter 1\n\nFirst chapter.");

    assert_work_dir_empty(&work);
}

#[tokio::test]
async fn test_split_defaults_to_level_one() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(split_request(&[Part::File {
            name: "book.yml",
            content: BOOK,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    assert_eq!(archive.len(), 2);
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(split_request(&[Part::Text {
            name: "level",
            value: "1",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "no file uploaded");
}

#[tokio::test]
async fn test_empty_file_name_is_bad_request() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(split_request(&[Part::File {
            name: "",
            content: BOOK,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "no file selected");
}

#[tokio::test]
async fn test_wrong_extension_is_bad_request() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(split_request(&[Part::File {
            name: "book.epub",
            content: BOOK,
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_level_is_bad_request() {
    let (app, _work) = test_app();

    let response = app
        .oneshot(split_request(&[
            Part::File {
                name: "book.yaml",
                content: BOOK,
            },
            Part::Text {
                name: "level",
                value: "deep",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_outline_is_unprocessable_and_cleaned_up() {
    let (app, work) = test_app();

    let response = app
        .oneshot(split_request(&[Part::File {
            name: "book.yaml",
            content: "toc: [unclosed",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_message(response)
        .await
        .starts_with("Failed to parse outline"));
    assert_work_dir_empty(&work);
}
