//! Practicum adapter (homework review statuses).
//!
//! Implements the `hsb-core` HomeworkApi port over the
//! `user_api/homework_statuses` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use tracing::debug;

use hsb_core::{domain::Cursor, errors::Error, ports::HomeworkApi, Result};

#[derive(Clone)]
pub struct PracticumClient {
    token: String,
    endpoint: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(
        token: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self {
            token: token.into(),
            endpoint: endpoint.into(),
            http,
        })
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_statuses(&self, from_date: Cursor) -> Result<serde_json::Value> {
        debug!("GET {} from_date={from_date}", self.endpoint);

        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date.0)])
            .send()
            .await
            .map_err(|e| Error::Request(format!("homework api request error: {e}")))?;

        if resp.status() != StatusCode::OK {
            return Err(Error::Endpoint {
                url: self.endpoint.clone(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Request(format!("homework api body error: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    const PATH: &str = "/api/user_api/homework_statuses/";

    async fn client_for(server: &MockServer) -> PracticumClient {
        PracticumClient::new(
            "secret",
            format!("{}{PATH}", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_oauth_header_and_from_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("from_date", "1000"))
            .and(header("Authorization", "OAuth secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"homeworks": [], "current_date": 1001})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server)
            .await
            .fetch_statuses(Cursor(1000))
            .await
            .unwrap();
        assert_eq!(body, json!({"homeworks": [], "current_date": 1001}));
    }

    #[tokio::test]
    async fn non_200_statuses_are_endpoint_errors() {
        for status in [201, 204, 400, 401, 404, 500, 503] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let client = client_for(&server).await;
            let err = client.fetch_statuses(Cursor(1)).await.unwrap_err();
            match err {
                Error::Endpoint { url, status: got } => {
                    assert_eq!(url, client.endpoint());
                    assert_eq!(got, status);
                }
                other => panic!("expected endpoint error for {status}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_a_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch_statuses(Cursor(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(!err.is_notifiable());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let client = PracticumClient::new(
            "secret",
            "http://127.0.0.1:9/homework_statuses/",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.fetch_statuses(Cursor(1)).await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }
}
