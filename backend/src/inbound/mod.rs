//! Inbound adapters that translate external requests into calls on the
//! [`UsuarioCrud`](crate::domain::ports::UsuarioCrud) driving port while
//! keeping framework details at the edge.

pub mod http;
