use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use super::models::{RemoveBgRequest, RemovedImage, UploadedImage};
use super::provider::{BackgroundRemover, RemovalError};
use super::secret::ApiKeySource;
use crate::config::RemoveBgConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// remove.bg 客户端：每次调用恰好发出一个 POST 请求。
#[derive(Clone)]
pub struct RemoveBgClient {
    client: reqwest::Client,
    endpoint: String,
    size: String,
    api_key: ApiKeySource,
}

impl RemoveBgClient {
    pub fn new(config: &RemoveBgConfig, api_key: ApiKeySource) -> Result<Self, reqwest::Error> {
        let client = crate::http::build_upstream_client(config.timeout())?;
        Ok(Self::with_client(client, config, api_key))
    }

    /// 复用外部构建的 Client（便于共享连接池）
    pub fn with_client(client: reqwest::Client, config: &RemoveBgConfig, api_key: ApiKeySource) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            size: config.size.clone(),
            api_key,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match self.api_key.lookup().and_then(|k| k.header_value()) {
            Some(value) => {
                headers.insert(API_KEY_HEADER, value);
            }
            None => tracing::warn!(
                source = %self.api_key.describe(),
                "未找到 remove.bg API Key，上游将返回认证失败"
            ),
        }
        headers
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, image: &UploadedImage) -> Result<RemovedImage, RemovalError> {
        let body = RemoveBgRequest {
            image_file_b64: image.to_base64(),
            size: self.size.clone(),
        };

        let started = Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .map_err(|e| RemovalError::Body(format!("读取上游错误正文失败: {e}")))?;
            tracing::warn!(status = status.as_u16(), "remove.bg 请求失败");
            return Err(RemovalError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RemovalError::Body(format!("读取上游图片失败: {e}")))?;
        tracing::info!(
            status = status.as_u16(),
            output_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "remove.bg 处理完成"
        );
        Ok(RemovedImage { bytes })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        Router,
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::RemoveBgClient;
    use crate::config::RemoveBgConfig;
    use crate::features::removal::models::UploadedImage;
    use crate::features::removal::provider::{BackgroundRemover, RemovalError};
    use crate::features::removal::secret::{ApiKey, ApiKeySource};

    #[derive(Debug, Clone)]
    struct Captured {
        api_key: Option<String>,
        content_type: Option<String>,
        body: serde_json::Value,
    }

    type Calls = Arc<Mutex<Vec<Captured>>>;

    /// 启动一个本地假上游，按给定状态码/正文应答，并记录收到的请求。
    async fn start_fake_upstream(status: StatusCode, reply: &'static [u8]) -> (String, Calls) {
        let calls: Calls = Arc::default();
        let app = Router::new()
            .route(
                "/v1.0/removebg",
                post(
                    move |State(calls): State<Calls>, headers: HeaderMap, body: Bytes| async move {
                        let header = |name: &str| {
                            headers
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string)
                        };
                        calls.lock().expect("lock").push(Captured {
                            api_key: header("x-api-key"),
                            content_type: header("content-type"),
                            body: serde_json::from_slice(&body).unwrap_or_default(),
                        });
                        (status, reply)
                    },
                ),
            )
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind tcp listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/v1.0/removebg"), calls)
    }

    fn client_for(endpoint: String, key: Option<&str>) -> RemoveBgClient {
        let config = RemoveBgConfig {
            endpoint,
            ..RemoveBgConfig::default()
        };
        let source = match key {
            Some(k) => ApiKeySource::Static(ApiKey::new(k)),
            None => ApiKeySource::env("BG_REMOVER_TEST_SURELY_UNSET_VAR"),
        };
        RemoveBgClient::new(&config, source).expect("build client")
    }

    fn sample_image() -> UploadedImage {
        UploadedImage {
            bytes: Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg"),
            content_type: Some("image/jpeg".into()),
            file_name: "cat.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_base64_json_with_api_key() {
        let (endpoint, calls) = start_fake_upstream(StatusCode::OK, b"\x89PNG-result").await;
        let client = client_for(endpoint, Some("test-key"));

        let out = client
            .remove_background(&sample_image())
            .await
            .expect("removal succeeds");
        assert_eq!(out.bytes.as_ref(), b"\x89PNG-result");

        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.api_key.as_deref(), Some("test-key"));
        assert_eq!(call.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            call.body["image_file_b64"],
            STANDARD.encode(b"\xff\xd8\xff\xe0fake-jpeg")
        );
        assert_eq!(call.body["size"], "regular");
    }

    #[tokio::test]
    async fn non_success_status_carries_upstream_text() {
        let (endpoint, _calls) = start_fake_upstream(StatusCode::FORBIDDEN, b"invalid api key").await;
        let client = client_for(endpoint, None);

        let err = client
            .remove_background(&sample_image())
            .await
            .expect_err("expected upstream error");
        match err {
            RemovalError::Upstream { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn env_key_is_read_on_every_request() {
        const VAR: &str = "BG_REMOVER_TEST_ENV_KEY_PER_REQUEST";
        let (endpoint, calls) = start_fake_upstream(StatusCode::OK, b"png").await;
        let config = RemoveBgConfig {
            endpoint,
            ..RemoveBgConfig::default()
        };
        // 变量名仅此测试使用，不与其它并行测试冲突
        unsafe { std::env::set_var(VAR, "first-key") };
        let client = RemoveBgClient::new(&config, ApiKeySource::env(VAR)).expect("build client");

        client
            .remove_background(&sample_image())
            .await
            .expect("first call");
        unsafe { std::env::set_var(VAR, "rotated-key") };
        client
            .remove_background(&sample_image())
            .await
            .expect("second call");
        unsafe { std::env::remove_var(VAR) };

        let calls = calls.lock().expect("lock");
        let keys: Vec<_> = calls.iter().map(|c| c.api_key.as_deref()).collect();
        assert_eq!(keys, vec![Some("first-key"), Some("rotated-key")]);
    }

    #[tokio::test]
    async fn missing_key_omits_header() {
        let (endpoint, calls) = start_fake_upstream(StatusCode::FORBIDDEN, b"missing key").await;
        let client = client_for(endpoint, None);
        let _ = client.remove_background(&sample_image()).await;

        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].api_key.is_none());
    }

    #[tokio::test]
    async fn no_memoization_between_calls() {
        let (endpoint, calls) = start_fake_upstream(StatusCode::OK, b"png").await;
        let client = client_for(endpoint, Some("k"));
        let image = sample_image();

        client.remove_background(&image).await.expect("first call");
        client.remove_background(&image).await.expect("second call");
        assert_eq!(calls.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // 先绑定再释放端口，得到一个大概率无人监听的地址
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = client_for(format!("http://{addr}/v1.0/removebg"), Some("k"));
        let err = client
            .remove_background(&sample_image())
            .await
            .expect_err("expected transport error");
        assert!(matches!(err, RemovalError::Transport(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn configured_timeout_maps_to_timeout_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind tcp listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    // 不返回任何 HTTP 响应，触发客户端超时。
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    drop(socket);
                });
            }
        });

        let config = RemoveBgConfig {
            endpoint: format!("http://{addr}/v1.0/removebg"),
            ..RemoveBgConfig::default()
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("build reqwest client");
        let client = RemoveBgClient::with_client(http, &config, ApiKeySource::Static(ApiKey::new("k")));

        let err = client
            .remove_background(&sample_image())
            .await
            .expect_err("expected timeout");
        assert!(matches!(err, RemovalError::Timeout), "got: {err:?}");
    }
}
