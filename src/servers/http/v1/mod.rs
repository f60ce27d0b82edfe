//! Version 1 of the HTTP tracker: the `announce` and `scrape` endpoints.
pub mod handlers;
pub mod query;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
