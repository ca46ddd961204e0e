pub mod api;
mod orchestrator;
mod provider;
mod transport;

pub use api::form_api::{FormApiProvider, FormApiSettings};
pub use api::json_api::{JsonApiProvider, JsonApiSettings};
pub use orchestrator::{ChainState, Conversion, DEFAULT_ATTEMPT_TIMEOUT, Orchestrator};
pub use provider::Provider;
pub use transport::{HttpReply, HttpTransport, ProviderRequest, ReqwestTransport, RequestBody, TransportError};
