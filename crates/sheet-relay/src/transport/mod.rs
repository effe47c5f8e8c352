//! Pluggable cross-process call mechanism.
//!
//! A [`Transport`] takes a qualified operation name and its parameter record
//! and resolves to the backend's returned data. Backend rejections surface as
//! [`SheetsError::Remote`](crate::SheetsError::Remote); channel failures surface
//! as the other error variants. Callers treat both the same way.

mod mock;
mod process;

pub use mock::{MockTransport, RecordedCall};
pub use process::{ProcessTransport, ProcessTransportConfig, BRIDGE_ENV};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one remote call and wait for its outcome.
    async fn invoke(&self, operation: &str, params: Value) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn invoke(&self, operation: &str, params: Value) -> Result<Value> {
        (**self).invoke(operation, params).await
    }
}
