//! Mock static site origin for testing the SEO proxy

use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal SPA shell, the same document the origin serves for every route
pub const SPA_SHELL: &str = "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Dilshan Music</title>\n</head>\n<body>\n<div id=\"root\"></div>\n</body>\n</html>\n";

/// Mock origin server
///
/// Serves HTML on any path by default; specific paths can be overridden
/// with other statuses or bodies. Mocks mounted later take precedence only
/// when the earlier ones do not match, so mount specific paths first.
pub struct MockOriginServer {
    server: MockServer,
}

impl MockOriginServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Serve [`SPA_SHELL`] for every GET
    pub async fn mock_spa_shell(&self) {
        self.mock_html_everywhere(SPA_SHELL).await;
    }

    /// Serve `html` for every GET
    pub async fn mock_html_everywhere(&self, html: &str) {
        Mock::given(method("GET"))
            .and(path_regex("^/.*$"))
            .respond_with(html_response(200, html))
            .mount(&self.server)
            .await;
    }

    /// Serve `html` with `status` on one path
    pub async fn mock_page(&self, page_path: &str, status: u16, html: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html_response(status, html))
            .mount(&self.server)
            .await;
    }

    /// Answer any request on `page_path` with `template`
    pub async fn mock_response(&self, page_path: &str, template: ResponseTemplate) {
        Mock::given(path(page_path))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Requests received so far, in arrival order
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

fn html_response(status: u16, html: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("Content-Type", "text/html; charset=utf-8")
        .insert_header("Cache-Control", "public, max-age=60")
        .set_body_string(html)
}
