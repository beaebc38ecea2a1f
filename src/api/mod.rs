//! HTTP surface of the inventory backend.
//!
//! The trait returns raw status and body so that classification (timeout vs. server
//! error vs. transport failure, `detail` extraction) lives with the callers and can be
//! exercised against in-memory doubles.

pub mod client;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::TransportError, models::SaveRequest};

pub use client::HttpInventoryApi;

pub const EXTRACT_PATH: &str = "/inventory/from-images";
pub const SAVE_PATH: &str = "/inventory/save";
pub const PRODUCTS_PATH: &str = "/inventory/products";
pub const VOICE_CONFIRM_PATH: &str = "/inventory/voice/confirm";

/// One multipart file part of the extraction upload.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub field_name: String,
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn extract(&self, parts: Vec<ImagePart>) -> Result<HttpReply, TransportError>;

    async fn save(&self, request: &SaveRequest) -> Result<HttpReply, TransportError>;

    async fn list_products(&self, skip: u32, limit: u32) -> Result<HttpReply, TransportError>;

    async fn voice_confirm(&self, product_name: &str) -> Result<HttpReply, TransportError>;
}
