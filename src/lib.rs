//! `risksense-http` is an async HTTP client for the RiskSense Platform
//! vulnerability-management REST API.
//!
//! The crate is built around two pieces:
//! - [`RequestExecutor`] — sends one request with retry/backoff applied and
//!   normalizes the outcome into a response or a typed error.
//! - [`PageAggregator`] — fetches every page of a paginated search
//!   concurrently and combines them into one sorted item list, tolerating
//!   individual page failures.
//!
//! [`RiskSenseClient`] wires both together and hands out resource handles
//! ([`Hosts`], [`Tags`], [`Clients`]); [`RiskSenseClient::subject`] reaches
//! any other searchable resource.

mod client;
mod clients;
mod error;
mod executor;
mod filters;
mod hosts;
mod options;
mod search;
mod subject;
mod tags;

pub use client::RiskSenseClient;
pub use clients::Clients;
pub use error::RiskSenseError;
pub use executor::{ApiResponse, FilePart, Method, RequestExecutor};
pub use filters::{Operator, Projection, SearchFilter, SortDirection};
pub use hosts::Hosts;
pub use options::ClientOptions;
pub use search::{FailurePolicy, PageAggregator};
pub use subject::{PageInfo, SearchParams, Subject};
pub use tags::{TagType, Tags};

pub type Result<T> = std::result::Result<T, RiskSenseError>;
