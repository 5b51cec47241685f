use super::{AssetError, AssetRequest, StoredResponse};
use crate::ui;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, header};

/// The network side of the asset cache.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<StoredResponse, AssetError>;
}

/// Fetches assets from a remote origin.
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: String,
}

impl HttpFetcher {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Connection-scoped headers that must not be relayed between hops.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "host"
            | "connection"
            | "content-length"
            | "transfer-encoding"
            | "keep-alive"
            | "upgrade"
            | "te"
            | "trailer"
            | "proxy-connection"
    )
}

fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<StoredResponse, AssetError> {
        let url = format!("{}{}", self.origin, request.path);
        let network = |err: reqwest::Error| AssetError::Network {
            path: request.path.clone(),
            reason: err.to_string(),
        };

        let response = self
            .client
            .request(request.method.clone(), &url)
            .headers(end_to_end(&request.headers))
            .body(request.body.clone())
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let mut headers = end_to_end(response.headers());
        headers.remove(header::CONTENT_TYPE);
        let body = response.bytes().await.map_err(network)?;

        Ok(StoredResponse {
            status,
            content_type,
            headers,
            body,
        })
    }
}

/// Serves the shell, manifest and icons compiled into the binary.
#[derive(Default)]
pub struct EmbeddedFetcher;

#[async_trait]
impl Fetcher for EmbeddedFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<StoredResponse, AssetError> {
        if request.method != Method::GET && request.method != Method::HEAD {
            return Ok(StoredResponse::text(
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed",
            ));
        }

        let path = request.path.split('?').next().unwrap_or_default();
        let (content_type, body) = match path {
            "/" | "/index.html" => ("text/html; charset=utf-8", ui::SHELL_HTML),
            "/manifest.webmanifest" => ("application/manifest+json", ui::MANIFEST_JSON),
            "/icons/icon-192.svg" => ("image/svg+xml", ui::ICON_192_SVG),
            "/icons/icon-512.svg" => ("image/svg+xml", ui::ICON_512_SVG),
            _ => return Ok(StoredResponse::text(StatusCode::NOT_FOUND, "not found")),
        };

        Ok(StoredResponse {
            status: StatusCode::OK,
            content_type: content_type.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedded_serves_every_manifest_entry() {
        let fetcher = EmbeddedFetcher;
        for path in super::super::MANIFEST {
            let response = fetcher.fetch(&AssetRequest::get(*path)).await.unwrap();
            assert_eq!(response.status, StatusCode::OK, "{path}");
            assert!(!response.body.is_empty());
        }
    }

    #[tokio::test]
    async fn embedded_rejects_unknown_and_mutating() {
        let fetcher = EmbeddedFetcher;
        let missing = fetcher.fetch(&AssetRequest::get("/nope.js")).await.unwrap();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let post = AssetRequest {
            method: Method::POST,
            path: "/index.html".to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        let rejected = fetcher.fetch(&post).await.unwrap();
        assert_eq!(rejected.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "localhost:3000".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer t".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());

        let forwarded = end_to_end(&headers);
        assert_eq!(forwarded.len(), 2);
        assert!(forwarded.contains_key(header::AUTHORIZATION));
        assert!(forwarded.contains_key(header::CONTENT_TYPE));
    }
}
