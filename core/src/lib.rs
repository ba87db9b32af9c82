//! Synchronous client core for the PetFriends pet-catalog service.
//!
//! # Overview
//! Wraps the seven PetFriends endpoints (`api/key`, pet listing, pet
//! creation with and without a photo, update, delete, photo upload). Every
//! operation sends one request and returns a `NormalizedResponse`: the
//! status code plus the body as parsed JSON, or as raw text when it is not
//! JSON.
//!
//! # Design
//! - `PetFriendsClient` holds only `base_url` and a `Transport`.
//! - Each operation has a pure `build_*` method, so request shape is testable
//!   without a network.
//! - Service-reported failures are values. Only transport failures and
//!   unreadable photo files are `Err`.
//! - `BlockingTransport` (feature `blocking`, on by default) executes requests
//!   with `reqwest::blocking`.

pub mod client;
pub mod error;
pub mod http;
#[cfg(feature = "blocking")]
pub mod transport;
pub mod types;

pub use client::{normalize, PetFriendsClient, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use http::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
#[cfg(feature = "blocking")]
pub use transport::BlockingTransport;
pub use types::{Credential, NormalizedResponse, Pet, PetForm, PetList, ResponseBody};
