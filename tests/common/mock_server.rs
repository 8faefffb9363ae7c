//! Mock HTTP server for reference palette retrieval.

use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockHttpServer {
    pub server: MockServer,
}

impl MockHttpServer {
    /// Start a new mock HTTP server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Mock a GET endpoint returning PNG bytes
    pub async fn mock_get_png(&self, endpoint: &str, png: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(png)
                    .insert_header("content-type", "image/png"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a GET endpoint returning a body that is not an image
    pub async fn mock_get_text(&self, endpoint: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/plain"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an endpoint that returns an error status
    pub async fn mock_error(&self, endpoint: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
