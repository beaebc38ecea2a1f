use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{
    header::ACCEPT,
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::json;

use crate::{config::ClientConfig, error::TransportError, models::SaveRequest};

use super::{
    HttpReply, ImagePart, InventoryApi, EXTRACT_PATH, PRODUCTS_PATH, SAVE_PATH, VOICE_CONFIRM_PATH,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest`-backed client. The extraction call carries no client-side timeout of its
/// own; the upload pipeline's deadline bounds it.
#[derive(Clone)]
pub struct HttpInventoryApi {
    client: Client,
    config: ClientConfig,
}

impl HttpInventoryApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn extract(&self, parts: Vec<ImagePart>) -> Result<HttpReply, TransportError> {
        let mut form = Form::new();
        for part in parts {
            let file = Part::bytes(part.bytes.as_ref().clone())
                .file_name(part.file_name)
                .mime_str("image/jpeg")
                .map_err(transport)?;
            form = form.part(part.field_name, file);
        }

        let url = self.url(EXTRACT_PATH);
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_reply(response).await
    }

    async fn save(&self, request: &SaveRequest) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .header(ACCEPT, "application/json")
            .timeout(self.config.save_timeout())
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_reply(response).await
    }

    async fn list_products(&self, skip: u32, limit: u32) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .get(self.url(PRODUCTS_PATH))
            .header(ACCEPT, "application/json")
            .query(&[("skip", skip), ("limit", limit)])
            .timeout(self.config.save_timeout())
            .send()
            .await
            .map_err(transport)?;
        read_reply(response).await
    }

    async fn voice_confirm(&self, product_name: &str) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(self.url(VOICE_CONFIRM_PATH))
            .timeout(self.config.save_timeout())
            .json(&json!({ "product_name": product_name }))
            .send()
            .await
            .map_err(transport)?;
        read_reply(response).await
    }
}

async fn read_reply(response: Response) -> Result<HttpReply, TransportError> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport)?;
    Ok(HttpReply::new(status, body.to_vec()))
}

fn transport(err: reqwest::Error) -> TransportError {
    let kind = if err.is_connect() {
        "connection failed"
    } else if err.is_timeout() {
        "request timed out"
    } else if err.is_body() || err.is_decode() {
        "response body unreadable"
    } else {
        "request failed"
    };
    TransportError::new(format!("{kind}: {err}"))
}
