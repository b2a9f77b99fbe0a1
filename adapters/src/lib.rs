//! Provider adapters for the generation orchestrator
//!
//! Every provider is driven through the same lifecycle: validate the
//! parameter bag into a typed adapter, configure request headers, execute
//! against an [`HttpTransport`], store the outcome. Asynchronous providers
//! share the [`Poller`].

pub mod error;
pub mod poller;
pub mod providers;
pub mod services;
pub mod task;
pub mod traits;
pub mod types;

pub use error::{AdapterResult, ParameterError, TaskFailure};
pub use poller::{status_code_is, status_in, Poller};
pub use providers::{builtin, ProviderEntry};
pub use services::RealHttpTransport;
pub use task::AdapterTask;
pub use traits::{constructor, Adapter, AdapterConstructor, HttpTransport, MockHttpTransport, ValidatedAdapter};
pub use types::*;
