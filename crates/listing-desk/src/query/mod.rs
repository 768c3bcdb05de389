//! Backend API access: bearer session with single-flight refresh, cursor
//! pagination over the marketplace collections, and OTP sign-in.

mod auth;
pub mod client;
pub mod models;
pub mod pagination;
pub mod resources;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests;

pub use auth::{OTP_REQUEST_PATH, OTP_VERIFY_PATH};
pub use client::{ApiClient, ApiError};
pub use models::{Enquiry, PropertySummary, SiteVisit};
pub use pagination::{InfiniteQuery, Page, PageRequest, PageSource};
pub use resources::{Resource, ResourcePages, ResourceQuery, SearchFilters};
pub use session::{Session, SessionTokens, UserProfile};
pub use transport::{
    BackendRequest, BackendResponse, BackendTransport, HttpMethod, ReqwestTransport,
    TransportError,
};
