use reqwest::Client;
use std::time::Duration;
use anyhow::Result;
use tracing::info;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// 短请求 Client: 用于 embedding 服务 (每个问题一次，文本很短)
    pub fn create() -> Result<Client> {
        let builder = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(30)));

        info!("🌐 [Http Client] Embedding client ready");

        let client = builder.build()?;
        Ok(client)
    }

    /// 长请求 Client: 用于 LLM 生成 (长 prompt + 长回答)
    pub fn create_for_llm(timeout_sec: u64) -> Result<Client> {
        let builder = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .connect_timeout(Duration::from_secs(30))
            .http1_only();

        let client = builder.build()?;
        Ok(client)
    }
}
