use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::{HttpReply, InventoryApi},
    error::{SaveError, TransportError},
    models::{ProductDraft, SavedProduct, StoredProduct},
    utils::InFlight,
};

use super::validation;

const GENERIC_SAVE_FAILURE: &str = "Could not save the product";

/// Validates drafts, stores them, and reads the catalog back.
#[derive(Clone)]
pub struct PersistenceClient {
    api: Arc<dyn InventoryApi>,
    in_flight: InFlight,
}

impl PersistenceClient {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self {
            api,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn save(&self, draft: &ProductDraft) -> Result<SavedProduct, SaveError> {
        let request = validation::prepare(draft)?;
        let _busy = self.in_flight.try_enter().ok_or(SaveError::InFlight)?;

        let reply = self.api.save(&request).await.map_err(network)?;
        if !reply.is_success() {
            let message = server_detail(&reply).unwrap_or_else(|| GENERIC_SAVE_FAILURE.to_string());
            warn!("save of '{}' rejected ({}): {message}", request.name, reply.status);
            return Err(SaveError::Rejected {
                status: reply.status,
                message,
            });
        }

        let saved: SavedProduct =
            serde_json::from_slice(&reply.body).map_err(|err| SaveError::Rejected {
                status: reply.status,
                message: format!("{GENERIC_SAVE_FAILURE}: unexpected response ({err})"),
            })?;
        info!("saved product {} ('{}')", saved.id, request.name);
        Ok(saved)
    }

    pub async fn list_products(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<StoredProduct>, SaveError> {
        let reply = self.api.list_products(skip, limit).await.map_err(network)?;
        if !reply.is_success() {
            return Err(SaveError::Rejected {
                status: reply.status,
                message: server_detail(&reply).unwrap_or_else(|| reply.text()),
            });
        }
        serde_json::from_slice(&reply.body).map_err(|err| SaveError::Rejected {
            status: reply.status,
            message: format!("unexpected product listing: {err}"),
        })
    }

    /// Fetch the spoken confirmation clip. Failures are logged and yield `None`.
    pub async fn voice_confirm(&self, product_name: &str) -> Option<Vec<u8>> {
        match self.api.voice_confirm(product_name).await {
            Ok(reply) if reply.is_success() && !reply.body.is_empty() => Some(reply.body),
            Ok(reply) => {
                warn!(
                    "voice confirmation returned {} with {} bytes",
                    reply.status,
                    reply.body.len()
                );
                None
            }
            Err(err) => {
                warn!("voice confirmation failed: {err}");
                None
            }
        }
    }
}

fn network(err: TransportError) -> SaveError {
    SaveError::NetworkFailure {
        message: err.message,
    }
}

#[derive(Deserialize)]
struct DetailBody {
    detail: Value,
}

/// FastAPI `detail`: either a message or a list of `{loc, msg}` entries.
fn server_detail(reply: &HttpReply) -> Option<String> {
    let body: DetailBody = serde_json::from_slice(&reply.body).ok()?;
    match body.detail {
        Value::String(message) if !message.trim().is_empty() => Some(message),
        Value::Array(entries) => {
            let rendered: Vec<String> = entries.iter().filter_map(render_entry).collect();
            (!rendered.is_empty()).then(|| rendered.join("; "))
        }
        _ => None,
    }
}

fn render_entry(entry: &Value) -> Option<String> {
    let msg = entry.get("msg").and_then(Value::as_str)?;
    let field = entry
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.iter().rev().find_map(|part| part.as_str().filter(|p| *p != "body")));
    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_string(),
    })
}
