//! Domain types, ports and services for the `Usuario` CRUD service.
//!
//! Public surface:
//! - [`OperationResult`] / [`ResponseCode`]: the outcome envelope every
//!   operation returns.
//! - [`Entity`], [`Filter`], [`Projection`], [`Tracking`]: the vocabulary
//!   repositories and stores share.
//! - [`DataAccessError`]: failures raised below the service boundary.
//! - [`Usuario`], [`UsuarioDto`], [`UpdateMode`]: the one aggregate.
//! - [`UsuarioCrudService`]: the driving-port implementation.

pub mod crud_service;
pub mod entity;
pub mod error;
pub mod ports;
pub mod repository;
pub mod result;
pub mod trace_id;
pub mod usuario;

pub use self::crud_service::{CrudStage, UsuarioCrudService};
pub use self::entity::{Entity, Filter, Projection, SequentialKey, Tracking};
pub use self::error::DataAccessError;
pub use self::result::{OperationResult, ResponseCode, UnknownResponseCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::usuario::{UNSAVED_ID, UpdateMode, Usuario, UsuarioDto};
