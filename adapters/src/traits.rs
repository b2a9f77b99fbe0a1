//! Adapter trait definitions for dependency injection

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use shared::{ParameterError, Parameters};

use crate::error::AdapterResult;
use crate::types::{Headers, HttpRequest, HttpResponse, ProviderSettings};

/// The shared network boundary every adapter calls through
#[mockall::automock]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue exactly one request and hand back the unclassified response
    async fn call(&self, request: HttpRequest) -> AdapterResult<HttpResponse>;
}

/// Lifecycle contract shared by every provider variant
///
/// An adapter value only exists once its parameters have been validated, so
/// construction is the validate stage. The remaining stages are
/// [`configure`](Adapter::configure) and [`execute`](Adapter::execute).
#[async_trait]
pub trait Adapter: Send + Sync + Debug {
    /// Provider key this adapter serves
    fn provider(&self) -> &str;

    /// Transport headers; pure, no network access
    fn configure(&self) -> Headers;

    /// Build the request, call the boundary, poll if the job is asynchronous
    async fn execute(&self, transport: &dyn HttpTransport, headers: Headers) -> AdapterResult<Value>;
}

/// Validation half of the contract, producing a ready adapter
pub trait ValidatedAdapter: Adapter + Sized + 'static {
    /// Check required fields and resolve lenient optionals against defaults
    fn validate(parameters: &Parameters, settings: &ProviderSettings) -> Result<Self, ParameterError>;
}

/// Type-erased validate-and-construct entry point kept by the registry
pub type AdapterConstructor = fn(&Parameters, &ProviderSettings) -> Result<Box<dyn Adapter>, ParameterError>;

/// Constructor for a concrete adapter type
pub fn constructor<A: ValidatedAdapter>() -> AdapterConstructor {
    build::<A>
}

fn build<A: ValidatedAdapter>(
    parameters: &Parameters,
    settings: &ProviderSettings,
) -> Result<Box<dyn Adapter>, ParameterError> {
    Ok(Box::new(A::validate(parameters, settings)?))
}
