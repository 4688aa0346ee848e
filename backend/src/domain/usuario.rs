//! The `Usuario` aggregate, its transport shape and the update merge rules.
//!
//! Column rules mirror the `usuario` table: `nombre`, `apellido`, `correo`
//! and `contrasena` are required; `correo` is unique. An empty string counts
//! as a missing required value.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, Projection};

/// Key carried by a `Usuario` that has not been persisted yet.
pub const UNSAVED_ID: i32 = 0;

const NOMBRE_MAX: usize = 100;
const APELLIDO_MAX: usize = 100;
const CORREO_MAX: usize = 150;
const CONTRASENA_MAX: usize = 200;
const TELEFONO_MAX: usize = 15;
const DIRECCION_MAX: usize = 200;

/// Row of the `usuario` table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Usuario {
    pub id_usuario: i32,
    pub nombre: String,
    pub apellido: String,
    pub correo: String,
    pub contrasena: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

impl Usuario {
    /// Build a transient entity from a transport payload.
    ///
    /// Missing required values become empty strings and are rejected by the
    /// store on insert.
    #[must_use]
    pub fn from_dto(dto: &UsuarioDto) -> Self {
        Self {
            id_usuario: UNSAVED_ID,
            nombre: dto.nombre.clone().unwrap_or_default(),
            apellido: dto.apellido.clone().unwrap_or_default(),
            correo: dto.correo.clone().unwrap_or_default(),
            contrasena: dto.contrasena.clone().unwrap_or_default(),
            telefono: dto.telefono.clone(),
            direccion: dto.direccion.clone(),
        }
    }

    /// Apply `dto` according to `mode`.
    ///
    /// [`UpdateMode::Full`] overwrites every column, clearing those the
    /// payload leaves empty. [`UpdateMode::Partial`] only touches columns the
    /// payload fills with a non-empty value. The identity never changes.
    pub fn apply(&mut self, dto: &UsuarioDto, mode: UpdateMode) {
        match mode {
            UpdateMode::Full => {
                self.nombre = dto.nombre.clone().unwrap_or_default();
                self.apellido = dto.apellido.clone().unwrap_or_default();
                self.correo = dto.correo.clone().unwrap_or_default();
                self.contrasena = dto.contrasena.clone().unwrap_or_default();
                self.telefono = dto.telefono.clone().filter(|v| !v.is_empty());
                self.direccion = dto.direccion.clone().filter(|v| !v.is_empty());
            }
            UpdateMode::Partial => {
                merge(&mut self.nombre, dto.nombre.as_deref());
                merge(&mut self.apellido, dto.apellido.as_deref());
                merge(&mut self.correo, dto.correo.as_deref());
                merge(&mut self.contrasena, dto.contrasena.as_deref());
                merge_optional(&mut self.telefono, dto.telefono.as_deref());
                merge_optional(&mut self.direccion, dto.direccion.as_deref());
            }
        }
    }

    /// Projection used by reads: every column except the password.
    #[must_use]
    pub fn read_projection() -> Projection<Self, UsuarioDto> {
        Projection::new(|u: &Self| UsuarioDto {
            id_usuario: u.id_usuario,
            nombre: Some(u.nombre.clone()),
            apellido: Some(u.apellido.clone()),
            correo: Some(u.correo.clone()),
            contrasena: None,
            telefono: u.telefono.clone(),
            direccion: u.direccion.clone(),
        })
    }

    /// Projection carrying only identity, name and email.
    #[must_use]
    pub fn summary_projection() -> Projection<Self, UsuarioDto> {
        Projection::new(|u: &Self| UsuarioDto {
            id_usuario: u.id_usuario,
            nombre: Some(u.nombre.clone()),
            correo: Some(u.correo.clone()),
            ..UsuarioDto::default()
        })
    }
}

fn merge(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        value.clone_into(target);
    }
}

fn merge_optional(target: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = Some(value.to_owned());
    }
}

fn required(column: &str, value: &str, max: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{column} is required"));
    }
    bounded(column, value, max)
}

fn bounded(column: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max {
        return Err(format!("{column} exceeds {max} characters (got {len})"));
    }
    Ok(())
}

impl Entity for Usuario {
    type Key = i32;
    const TABLE: &'static str = "usuario";

    fn key(&self) -> i32 {
        self.id_usuario
    }

    fn with_key(self, key: i32) -> Self {
        Self {
            id_usuario: key,
            ..self
        }
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("correo", self.correo.clone())]
    }

    fn check_constraints(&self) -> Result<(), String> {
        required("nombre", &self.nombre, NOMBRE_MAX)?;
        required("apellido", &self.apellido, APELLIDO_MAX)?;
        required("correo", &self.correo, CORREO_MAX)?;
        required("contrasena", &self.contrasena, CONTRASENA_MAX)?;
        if let Some(telefono) = &self.telefono {
            bounded("telefono", telefono, TELEFONO_MAX)?;
        }
        if let Some(direccion) = &self.direccion {
            bounded("direccion", direccion, DIRECCION_MAX)?;
        }
        Ok(())
    }
}

/// Transport shape of a `Usuario`.
///
/// Every column except the identity is optional so partial updates and
/// field-omitting responses share one type.
///
/// # Examples
/// ```
/// use usuario_api::domain::UsuarioDto;
///
/// let dto: UsuarioDto = serde_json::from_str(r#"{"nombre":"Ana"}"#).unwrap();
/// assert_eq!(dto.id_usuario, 0);
/// assert_eq!(
///     serde_json::to_string(&dto).unwrap(),
///     r#"{"idUsuario":0,"nombre":"Ana"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioDto {
    #[serde(default)]
    pub id_usuario: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

impl UsuarioDto {
    /// Check the column rules against the row `mode` would produce.
    ///
    /// Inserts and [`UpdateMode::Full`] need every required column;
    /// [`UpdateMode::Partial`] only bounds the values it would write.
    ///
    /// # Errors
    /// Describes the first rule the payload breaks.
    pub fn check(&self, mode: UpdateMode) -> Result<(), String> {
        if mode == UpdateMode::Full {
            return Usuario::from_dto(self).check_constraints();
        }
        let columns = [
            ("nombre", self.nombre.as_deref(), NOMBRE_MAX),
            ("apellido", self.apellido.as_deref(), APELLIDO_MAX),
            ("correo", self.correo.as_deref(), CORREO_MAX),
            ("contrasena", self.contrasena.as_deref(), CONTRASENA_MAX),
            ("telefono", self.telefono.as_deref(), TELEFONO_MAX),
            ("direccion", self.direccion.as_deref(), DIRECCION_MAX),
        ];
        for (column, value, max) in columns {
            if let Some(value) = value {
                bounded(column, value, max)?;
            }
        }
        Ok(())
    }
}

/// How an update payload is merged into the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Replace every column.
    Full,
    /// Only overwrite columns with a non-empty value in the payload.
    #[default]
    Partial,
}

impl UpdateMode {
    #[must_use]
    pub const fn from_full_flag(full: bool) -> Self {
        if full { Self::Full } else { Self::Partial }
    }
}
