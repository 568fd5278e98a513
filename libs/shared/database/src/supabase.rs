use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DbError;

pub const PREFER_REPRESENTATION: &str = "return=representation";
pub const PREFER_IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=minimal";

/// Render a PostgREST `in.(...)` filter value.
pub fn in_filter<T: ToString>(values: &[T]) -> String {
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, DbError> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(DbError::from_response(status.as_u16(), text));
        }

        // `return=minimal` and DELETE without representation answer with an empty body.
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Write that answers with the affected rows.
    pub async fn write_returning<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(
            method,
            path,
            Some(auth_token),
            body,
            Some(prefer(PREFER_REPRESENTATION)),
        )
        .await
    }

    /// Call a database function through `/rest/v1/rpc/<name>`.
    pub async fn rpc<T>(&self, function: &str, auth_token: &str, args: Value) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(auth_token), Some(args)).await
    }
}

pub fn prefer(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("prefer"), HeaderValue::from_static(value));
    headers
}

fn header_value(raw: &str) -> Result<HeaderValue, DbError> {
    HeaderValue::from_str(raw).map_err(|e| DbError::InvalidHeader(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn config_for(uri: &str) -> AppConfig {
        AppConfig {
            supabase_url: uri.to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: "unused".to_string(),
            server_port: 3000,
            display_utc_offset_minutes: 0,
        }
    }

    #[test]
    fn test_in_filter() {
        assert_eq!(in_filter(&["a", "b"]), "in.(a,b)");
        assert_eq!(in_filter::<String>(&[]), "in.()");
    }

    #[tokio::test]
    async fn test_request_sends_api_key_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("status", "eq.pending"))
            .and(header("apikey", "test-anon-key"))
            .and(header("Authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let rows: Vec<Value> = client
            .request(
                Method::GET,
                "/rest/v1/tasks?status=eq.pending",
                Some("token-123"),
                None,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/medication_logs"))
            .and(|req: &Request| {
                req.headers
                    .get("prefer")
                    .and_then(|value| value.to_str().ok())
                    == Some(PREFER_IGNORE_DUPLICATES)
            })
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let result: Result<(), DbError> = client
            .request_with_headers(
                Method::POST,
                "/rest/v1/medication_logs",
                Some("token"),
                Some(json!([])),
                Some(prefer(PREFER_IGNORE_DUPLICATES)),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unique_violation_surfaces_as_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/family_members"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"family_members_family_id_user_id_key\""
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&config_for(&server.uri()));
        let result: Result<Vec<Value>, DbError> = client
            .write_returning(Method::POST, "/rest/v1/family_members", "token", Some(json!({})))
            .await;

        assert_matches!(result, Err(DbError::Conflict(_)));
    }
}
