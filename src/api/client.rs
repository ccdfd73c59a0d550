use crate::api::{ApiError, ProjectPage};
use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use tracing::debug;
use url::Url;

const PROJECTS_PATH: &str = "api/projects";

/// HTTP client for the paged projects endpoint
#[derive(Clone)]
pub struct ProjectsClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl ProjectsClient {
  pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
    let http = Self::http_builder(config).build()?;
    Self::with_http(http, &config.base_url)
  }

  fn http_builder(config: &ApiConfig) -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
      USER_AGENT,
      HeaderValue::from_static(concat!("projpage/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
  }

  fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
    Ok(Self {
      http,
      endpoint: endpoint_url(base_url)?,
    })
  }

  /// The origin requests are sent to, for display in the header
  pub fn origin(&self) -> String {
    self.endpoint.origin().ascii_serialization()
  }

  /// Full URL for a page request
  pub fn page_url(&self, page: u32) -> Url {
    let mut url = self.endpoint.clone();
    url
      .query_pairs_mut()
      .append_pair("page", &page.to_string());
    url
  }

  /// Fetch one page of projects
  pub async fn fetch_page(&self, page: u32) -> Result<ProjectPage, ApiError> {
    let url = self.page_url(page);
    debug!(%url, "requesting page");

    let response = self.http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ApiError::Status {
        status,
        body: body.trim().to_string(),
      });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

/// Resolve `<base>/api/projects`, keeping any path prefix on the base URL
fn endpoint_url(base_url: &str) -> Result<Url, ApiError> {
  let mut base = Url::parse(base_url)?;
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  Ok(base.join(PROJECTS_PATH)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::sync::oneshot;

  fn config(base_url: &str) -> ApiConfig {
    ApiConfig {
      base_url: base_url.to_string(),
      timeout_secs: 5,
    }
  }

  /// Client for a local test server, ignoring any proxy in the environment
  fn local_client(base_url: &str) -> ProjectsClient {
    let http = ProjectsClient::http_builder(&config(base_url))
      .no_proxy()
      .build()
      .unwrap();
    ProjectsClient::with_http(http, base_url).unwrap()
  }

  /// Serve a single canned HTTP response, reporting the request line back
  async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
      "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
      status_line,
      body.len(),
      body
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = Vec::new();
      let mut chunk = [0u8; 1024];
      while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
          break;
        }
        buf.extend_from_slice(&chunk[..n]);
      }
      let request = String::from_utf8_lossy(&buf);
      let request_line = request.lines().next().unwrap_or_default().to_string();
      let _ = tx.send(request_line);
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.ok();
    });

    (format!("http://{}", addr), rx)
  }

  #[test]
  fn test_page_url() {
    let client = ProjectsClient::new(&config("http://localhost:3000")).unwrap();
    assert_eq!(
      client.page_url(3).as_str(),
      "http://localhost:3000/api/projects?page=3"
    );
  }

  #[test]
  fn test_page_url_keeps_base_path() {
    let client = ProjectsClient::new(&config("https://example.com/demo")).unwrap();
    assert_eq!(
      client.page_url(0).as_str(),
      "https://example.com/demo/api/projects?page=0"
    );
    assert_eq!(client.origin(), "https://example.com");
  }

  #[test]
  fn test_invalid_base_url() {
    let result = ProjectsClient::new(&config("not a url"));
    assert!(matches!(result, Err(ApiError::Url(_))));
  }

  #[tokio::test]
  async fn test_fetch_page_success() {
    let (base, request) = serve_once(
      "200 OK",
      r#"{"projects":[{"id":1,"name":"A"}],"hasMore":true}"#,
    )
    .await;
    let client = local_client(&base);

    let page = client.fetch_page(2).await.unwrap();

    assert_eq!(page.projects.len(), 1);
    assert_eq!(page.projects[0].name, "A");
    assert!(page.has_more);
    assert_eq!(request.await.unwrap(), "GET /api/projects?page=2 HTTP/1.1");
  }

  #[tokio::test]
  async fn test_fetch_page_http_error() {
    let (base, _request) = serve_once("500 Internal Server Error", "boom").await;
    let client = local_client(&base);

    let err = client.fetch_page(0).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { .. }));
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("boom"));
  }

  #[tokio::test]
  async fn test_fetch_page_bad_body() {
    let (base, _request) = serve_once("200 OK", r#"{"items":[]}"#).await;
    let client = local_client(&base);

    let err = client.fetch_page(0).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
  }

  #[tokio::test]
  async fn test_fetch_page_connection_refused() {
    // Bind and drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = local_client(&format!("http://{}", addr));
    let err = client.fetch_page(0).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
  }
}
