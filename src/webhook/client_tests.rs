//! Tests for `ReqwestClient` against a local mock server.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{ClientOptions, HttpClient, HttpError, HttpRequest, ProxySettings, ReqwestClient};

fn server_url(server: &MockServer, route: &str) -> url::Url {
    url::Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

mod construction {
    use super::*;

    #[test]
    fn default_options_use_long_read_timeout() {
        let options = ClientOptions::default();

        assert_eq!(options.timeout, Duration::from_secs(1200));
        assert_eq!(options.connect_timeout, Duration::from_secs(30));
        assert!(options.proxy.is_none());
    }

    #[test]
    fn with_options_accepts_proxy() {
        let options = ClientOptions {
            proxy: Some(ProxySettings {
                server: "proxy.internal".to_string(),
                port: 3128,
                user: Some("trillian".to_string()),
                password: Some("secret".to_string()),
                excludes: vec!["localhost".to_string(), "*.internal".to_string()],
            }),
            ..ClientOptions::default()
        };

        assert!(ReqwestClient::with_options(&options).is_ok());
    }

    #[test]
    fn proxy_url_uses_http_scheme() {
        let settings = ProxySettings {
            server: "proxy.internal".to_string(),
            port: 8080,
            user: None,
            password: None,
            excludes: Vec::new(),
        };

        assert_eq!(settings.url(), "http://proxy.internal:8080");
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestClient>();
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("x-token", "abc"))
            .and(body_string("{\"id\":\"1\"}"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::post(server_url(&server, "/hook"))
            .with_header(
                http::HeaderName::from_static("x-token"),
                http::HeaderValue::from_static("abc"),
            )
            .with_body(b"{\"id\":\"1\"}".to_vec());

        let response = ReqwestClient::new().request(request).await.unwrap();

        assert_eq!(response.status, http::StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let response = ReqwestClient::new()
            .request(HttpRequest::get(server_url(&server, "/status")))
            .await
            .unwrap();

        assert_eq!(response.status, http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body_text(), Some("busy"));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let options = ClientOptions {
            timeout: Duration::from_millis(100),
            ..ClientOptions::default()
        };
        let client = ReqwestClient::with_options(&options).unwrap();

        let result = client
            .request(HttpRequest::get(server_url(&server, "/slow")))
            .await;

        assert!(matches!(result, Err(HttpError::Timeout)));
    }

    #[tokio::test]
    async fn closed_port_is_connection_error() {
        let url = url::Url::parse("http://127.0.0.1:1/gone").unwrap();

        let result = ReqwestClient::new().request(HttpRequest::get(url)).await;

        // Behind a proxy the proxy answers with an error status instead.
        match result {
            Err(HttpError::Connection(_)) => {}
            Ok(resp) if !resp.is_success() => {}
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
