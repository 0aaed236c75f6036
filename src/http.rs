use reqwest::Client;
use std::time::Duration;

/// 上游请求使用的 User-Agent
const USER_AGENT: &str = concat!("bg-remover/", env!("CARGO_PKG_VERSION"));

/// 构建访问上游的 HTTP Client（连接池/Keep-Alive 在同一实例内复用）。
///
/// - `timeout = None` 时不设总超时，与上游原始语义一致：请求会一直挂起直到上游响应或连接失败。
/// - `Client` 本身是线程安全的，整个进程只需持有一份。
pub fn build_upstream_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    builder.build()
}
