//! Orange Core - shared library for the Orange library-records client.
//!
//! This crate contains everything the front ends need:
//! - `auth`: credential storage and the session manager
//! - `api`: authenticated REST client for the records service
//! - `models`: books, librarians, members and students
//! - `navigation`: which routes are reachable for a session state
//! - `screens`: list/form controllers that turn API results into notices
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod screens;
