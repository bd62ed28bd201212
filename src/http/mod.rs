//! Single-request execution against the target and the client capability it
//! runs on.
mod executor;
mod fetcher;
mod request;

#[cfg(test)]
mod tests;

pub use executor::execute_request;
pub use fetcher::{FetchResponse, Fetcher, OutboundRequest, ReqwestTransport, Transport};
pub use request::{CACHE_BUST_PARAM, RequestTemplate, USER_AGENTS, cache_busted_url};
