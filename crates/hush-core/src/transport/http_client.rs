//! `reqwest`-backed request/response primitive.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{HttpRequest, HttpResponse, HttpTransport, RequestBody};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|error| Error::Transport(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&value),
            RequestBody::Multipart(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|error| {
                        Error::Transport(format!("Invalid upload content type: {error}"))
                    })?;
                builder.multipart(Form::new().part(file.field_name, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|error| Error::Transport(format!("Request failed: {error}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|error| Error::Transport(format!("Failed to read response body: {error}")))?;

        Ok(HttpResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
