#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, header};

use bg_remover::config::AppConfig;
use bg_remover::features::removal::{BackgroundRemover, RemovalError, RemovedImage, UploadedImage};
use bg_remover::{AppState, build_app};

pub const BOUNDARY: &str = "----bgremover-test-boundary";

/// 单个 multipart 字段
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn image(data: &'a [u8]) -> Self {
        Self {
            name: "image",
            file_name: Some("photo.jpg"),
            content_type: Some("image/jpeg"),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", p.name);
        if let Some(f) = p.file_name {
            disposition.push_str(&format!("; filename=\"{f}\""));
        }
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(ct) = p.content_type {
            out.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(p.data);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

pub fn upload_request(path: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("build request")
}

/// 预设的上游结果
#[derive(Clone)]
pub enum Outcome {
    Png(&'static [u8]),
    Upstream(u16, &'static str),
    Transport(&'static str),
}

/// 记录每次调用输入、按预设返回结果的去背景实现
pub struct ScriptedRemover {
    outcome: Outcome,
    pub calls: Mutex<Vec<Bytes>>,
}

impl ScriptedRemover {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }
}

#[async_trait]
impl BackgroundRemover for ScriptedRemover {
    async fn remove_background(&self, image: &UploadedImage) -> Result<RemovedImage, RemovalError> {
        self.calls.lock().expect("lock").push(image.bytes.clone());
        match self.outcome.clone() {
            Outcome::Png(b) => Ok(RemovedImage {
                bytes: Bytes::from_static(b),
            }),
            Outcome::Upstream(status, msg) => Err(RemovalError::Upstream {
                status,
                message: msg.to_string(),
            }),
            Outcome::Transport(msg) => Err(RemovalError::Transport(msg.to_string())),
        }
    }
}

pub fn app_with(remover: Arc<dyn BackgroundRemover>, config: &AppConfig) -> axum::Router {
    build_app(config, AppState::new(remover, config.upload.clone()))
}

pub async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}
