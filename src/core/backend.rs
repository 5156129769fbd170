use crate::models::error::SError;
use futures::future::BoxFuture;
use serde_json::Value;

/// The out-of-process backend, reached through named request/response calls.
///
/// The returned future must not borrow `self` so callers can detach it
/// (see [`crate::commands::invoke_with_timeout`]).
pub trait Backend: Send + Sync {
    fn invoke(&self, command: &str, args: Value) -> BoxFuture<'static, Result<Value, SError>>;
}
