//! HTTP client for the template service middle tier

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tde_core::TemplateDocument;

use super::{
    ExtractionResult, InsertResult, TemplateGateway, TemplateList, ValidationResult,
};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

const DATABASES_PATH: &str = "/api/databases";
const TEMPLATES_PATH: &str = "/api/tde/templates";
const TEMPLATE_GET_PATH: &str = "/api/tde/template/get";
const TEMPLATE_VALIDATE_PATH: &str = "/api/tde/template/validate";
const TEMPLATE_EXTRACT_PATH: &str = "/api/tde/template/extract";
const TEMPLATE_INSERT_PATH: &str = "/api/tde/template/insert";

/// Longest slice of an error body kept in [`GatewayError::Status`]
const ERROR_BODY_LIMIT: usize = 200;

/// Talks to the template service over HTTP with basic auth
pub struct HttpTemplateGateway {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTemplateGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport {
                endpoint: config.base_url.clone(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }

    async fn fetch_bytes(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}", endpoint, status);
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| GatewayError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let bytes = self.fetch_bytes(endpoint, request).await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TemplateGateway for HttpTemplateGateway {
    async fn list_databases(&self) -> Result<Vec<String>, GatewayError> {
        let request = self.http.get(self.url(DATABASES_PATH));
        self.fetch_json(DATABASES_PATH, request).await
    }

    async fn list_templates(&self, database: &str) -> Result<TemplateList, GatewayError> {
        let request = self
            .http
            .get(self.url(TEMPLATES_PATH))
            .query(&[("contentDB", database)]);
        self.fetch_json(TEMPLATES_PATH, request).await
    }

    async fn get_template(
        &self,
        database: &str,
        uri: &str,
    ) -> Result<TemplateDocument, GatewayError> {
        let request = self
            .http
            .get(self.url(TEMPLATE_GET_PATH))
            .query(&[("contentDB", database), ("templateURI", uri)]);
        let bytes = self.fetch_bytes(TEMPLATE_GET_PATH, request).await?;

        let mut doc = TemplateDocument::from_slice(&bytes).map_err(|e| GatewayError::Decode {
            endpoint: TEMPLATE_GET_PATH.to_string(),
            message: e.to_string(),
        })?;
        doc.uri = uri.to_string();
        Ok(doc)
    }

    async fn validate_template(
        &self,
        doc: &TemplateDocument,
    ) -> Result<ValidationResult, GatewayError> {
        let request = self.http.post(self.url(TEMPLATE_VALIDATE_PATH)).json(doc);
        self.fetch_json(TEMPLATE_VALIDATE_PATH, request).await
    }

    async fn extract_template(
        &self,
        sample_uris: &[String],
        database: &str,
        doc: &TemplateDocument,
    ) -> Result<ExtractionResult, GatewayError> {
        let mut query: Vec<(&str, &str)> = sample_uris
            .iter()
            .map(|uri| ("uri", uri.as_str()))
            .collect();
        query.push(("contentDB", database));

        let request = self
            .http
            .post(self.url(TEMPLATE_EXTRACT_PATH))
            .query(&query)
            .json(doc);
        self.fetch_json(TEMPLATE_EXTRACT_PATH, request).await
    }

    async fn insert_template(
        &self,
        uri: &str,
        database: &str,
        doc: &TemplateDocument,
    ) -> Result<InsertResult, GatewayError> {
        let request = self
            .http
            .post(self.url(TEMPLATE_INSERT_PATH))
            .query(&[("contentDB", database), ("templateURI", uri)])
            .json(doc);
        self.fetch_json(TEMPLATE_INSERT_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = GatewayConfig {
            base_url: "http://localhost:4001/".to_string(),
            ..GatewayConfig::default()
        };
        let gateway = HttpTemplateGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:4001");
        assert_eq!(
            gateway.url(DATABASES_PATH),
            "http://localhost:4001/api/databases"
        );
    }
}
