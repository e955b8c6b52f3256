#![cfg(feature = "service")]

mod common;

use std::net::SocketAddr;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use canvas_extend::io::writers::encode_raster;
use canvas_extend::service::{ExtendCanvasResponse, Server, ServiceConfig};
use canvas_extend::{OutputFormat, Raster};
use common::product_shot;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Running {
    addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

async fn start(temp_dir: &Path, request_timeout_secs: u64) -> Running {
    let config = ServiceConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        max_concurrency: 2,
        request_timeout_secs,
        max_body_bytes: 4 * 1024 * 1024,
        temp_dir: temp_dir.to_path_buf(),
        ..Default::default()
    };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));
    Running {
        addr,
        _shutdown: tx,
    }
}

/// Serves `response` verbatim to every connection; `None` accepts and never answers.
async fn origin(response: Option<Vec<u8>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                match response {
                    Some(bytes) => {
                        let _ = stream.write_all(&bytes).await;
                    }
                    None => tokio::time::sleep(std::time::Duration::from_secs(30)).await,
                }
            });
        }
    });
    addr
}

fn png_response(png: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        png.len()
    )
    .into_bytes();
    out.extend_from_slice(png);
    out
}

fn shot_png() -> Vec<u8> {
    encode_raster(&product_shot(80, 100, 30..=70, 245, 25), OutputFormat::Png, 95).unwrap()
}

async fn post(addr: SocketAddr, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/extend-canvas"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let bytes = response.bytes().await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn inline_bytes_round_trip() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;
    let body = json!({
        "imageBytes": general_purpose::STANDARD.encode(shot_png()),
        "desiredHeight": 180,
        "outputFormat": "jpeg",
    });

    let (status, json) = post(service.addr, body).await;
    assert_eq!(status, 200, "{json}");
    let response: ExtendCanvasResponse = serde_json::from_value(json).unwrap();
    assert!(response.success);
    assert_eq!((response.width, response.height), (80, 180));
    assert_eq!(response.threshold, 240);
    assert_eq!(response.format, OutputFormat::Jpeg);

    let bytes = general_purpose::STANDARD.decode(response.processed_image).unwrap();
    let out = Raster::decode(&bytes).unwrap();
    assert_eq!((out.width(), out.height()), (80, 180));
}

#[tokio::test]
async fn url_source_is_spooled_and_released() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;
    let origin = origin(Some(png_response(&shot_png()))).await;
    let body = json!({
        "imageUrl": format!("http://{origin}/shot.png"),
        "desiredHeight": 150,
        "whiteThresh": 200,
    });

    let (status, json) = post(service.addr, body).await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["height"], 150);
    assert_eq!(json["threshold"], 200);
    assert_eq!(json["autoThreshold"], false);
    assert_eq!(std::fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn pipeline_failures_map_to_422() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;
    let blank = encode_raster(&Raster::filled(50, 50, &[255; 3]).unwrap(), OutputFormat::Png, 95)
        .unwrap();

    let (status, json) = post(
        service.addr,
        json!({ "imageBytes": general_purpose::STANDARD.encode(blank), "desiredHeight": 100 }),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "NoSubjectDetected");

    let (status, json) = post(
        service.addr,
        json!({ "imageBytes": general_purpose::STANDARD.encode(shot_png()), "desiredHeight": 20 }),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(json["error"]["kind"], "InvalidTargetHeight");
}

#[tokio::test]
async fn failed_download_is_a_resource_error() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;
    let origin = origin(Some(
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
    ))
    .await;

    let (status, json) = post(
        service.addr,
        json!({ "imageUrl": format!("http://{origin}/gone.png"), "desiredHeight": 100 }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(json["error"]["kind"], "ResourceError");
}

#[tokio::test]
async fn stalled_source_times_out() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 1).await;
    let origin = origin(None).await;

    let (status, json) = post(
        service.addr,
        json!({ "imageUrl": format!("http://{origin}/slow.png"), "desiredHeight": 100 }),
    )
    .await;
    assert_eq!(status, 504);
    assert_eq!(json["error"]["kind"], "Timeout");
    assert_eq!(std::fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;

    let mut stream = tokio::net::TcpStream::connect(service.addr).await.unwrap();
    stream
        .write_all(b"POST /extend-canvas HTTP/1.1\r\nContent-Length: 999999999\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 413 "), "{text}");
}

#[tokio::test]
async fn health_check() {
    let spool = tempfile::tempdir().unwrap();
    let service = start(spool.path(), 30).await;
    let response = reqwest::get(format!("http://{}/health", service.addr))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let json: Value = serde_json::from_slice(&response.bytes().await.unwrap()).unwrap();
    assert_eq!(json, json!({ "status": "ok" }));
}
