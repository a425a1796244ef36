//! HTTP API.

mod convert;
mod form;
mod handlers;
mod middleware;
mod payload;
mod routes;
mod transfer;
mod video;

pub use routes::create_router;
