//! Clients for the managed backend
//!
//! This crate holds the production side of the session core's collaborator
//! traits (the authentication client and the profile store) together with
//! the shared REST transport and the typed repositories for the
//! application's data tables. Every call here is a direct authenticated
//! request against the backend; no business logic lives on this side of the
//! wire.

pub mod auth;
pub mod jwt;
pub mod models;
pub mod profiles;
pub mod query;
pub mod repositories;
pub mod rest;
pub mod storage;

pub use auth::AuthClient;
pub use profiles::{ProfileClient, UpdateProfile};
pub use query::{Filter, FilterOp, TableQuery};
pub use rest::RestClient;
pub use storage::SessionFile;
