//! repoapi-server: HTTP API over a repository store
//!
//! Every API request gets an [`ApiContext`] that carries the resolved
//! repository, an optional organization, and the shared settings. Handlers
//! report failures through [`ApiContext::error`] and emit pagination links
//! through [`ApiContext::set_link_header`].

pub mod context;
pub mod http;
pub mod pagination;

#[cfg(test)]
mod test_support;

pub use context::{ApiContext, ApiOrganization, Context, RepoContext};
pub use http::{run_server, ApiError, AppState, ErrorPayload, ServerConfig, ServerError};
pub use pagination::Paginater;
