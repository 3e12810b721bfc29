//! REST API client module for the records service.
//!
//! This module provides the `ApiClient` for obtaining tokens and for
//! authenticated CRUD calls against the book, librarian, member and student
//! collections.
//!
//! Every protected request reads the access token from the session right
//! before it is sent and attaches it as a bearer credential. Without a token
//! the request is never sent.

pub mod client;
pub mod error;
pub mod resource;

pub use client::{ApiClient, RejectionPolicy, TokenPair};
pub use error::ApiError;
pub use resource::{FormBody, ImageUpload, Resource};
