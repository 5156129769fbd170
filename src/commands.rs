pub mod catalog;
pub mod mods;
pub mod setup;

use crate::core::backend::Backend;
use crate::models::error::SError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A backend command with its argument and result shapes.
pub trait Command {
    const NAME: &'static str;
    type Args: Serialize + Send + Sync;
    type Output: DeserializeOwned + Send + 'static;
}

/// Arguments for commands that take none.
#[derive(Serialize, Debug, Clone, Copy, Default)]
pub struct NoArgs {}

fn encode_args<C: Command>(args: &C::Args) -> Result<serde_json::Value, SError> {
    serde_json::to_value(args)
        .map_err(|e| SError::ParseError(format!("Failed to encode args for {}: {e}", C::NAME)))
}

fn decode_output<C: Command>(value: serde_json::Value) -> Result<C::Output, SError> {
    serde_json::from_value(value)
        .map_err(|e| SError::ParseError(format!("Unexpected result from {}: {e}", C::NAME)))
}

pub async fn invoke_typed<C: Command>(
    backend: &dyn Backend,
    args: &C::Args,
) -> Result<C::Output, SError> {
    debug!("invoke {}", C::NAME);
    let value = backend.invoke(C::NAME, encode_args::<C>(args)?).await?;
    decode_output::<C>(value)
}

/// Like [`invoke_typed`], but gives up waiting after `timeout`.
///
/// The backend call keeps running on the runtime after a timeout; only the wait is abandoned.
pub async fn invoke_with_timeout<C: Command>(
    backend: &dyn Backend,
    args: &C::Args,
    timeout: Duration,
) -> Result<C::Output, SError> {
    let call = tokio::spawn(backend.invoke(C::NAME, encode_args::<C>(args)?));

    match tokio::time::timeout(timeout, call).await {
        Ok(joined) => decode_output::<C>(joined??),
        Err(_) => {
            warn!("{} did not answer within {:?}", C::NAME, timeout);
            Err(SError::Timeout(format!("invoke-timeout:{}", C::NAME)))
        }
    }
}
