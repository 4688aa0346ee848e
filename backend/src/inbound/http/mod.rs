//! HTTP inbound adapter exposing the `usuarios` REST endpoints.

pub mod response;
pub mod state;
pub mod usuarios;

pub use state::HttpState;
