//! Internal Diesel row structs; never exposed to the domain.

use diesel::prelude::*;

use crate::domain::Usuario;

use super::schema::usuario;

/// Row read from the `usuario` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = usuario)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UsuarioRow {
    pub id_usuario: i32,
    pub nombre: String,
    pub apellido: String,
    pub correo: String,
    pub contrasena: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

impl From<UsuarioRow> for Usuario {
    fn from(row: UsuarioRow) -> Self {
        Self {
            id_usuario: row.id_usuario,
            nombre: row.nombre,
            apellido: row.apellido,
            correo: row.correo,
            contrasena: row.contrasena,
            telefono: row.telefono,
            direccion: row.direccion,
        }
    }
}

/// Insertable row; the key is left to the database sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usuario)]
pub(crate) struct NewUsuarioRow<'a> {
    pub nombre: &'a str,
    pub apellido: &'a str,
    pub correo: &'a str,
    pub contrasena: &'a str,
    pub telefono: Option<&'a str>,
    pub direccion: Option<&'a str>,
}

impl<'a> From<&'a Usuario> for NewUsuarioRow<'a> {
    fn from(u: &'a Usuario) -> Self {
        Self {
            nombre: &u.nombre,
            apellido: &u.apellido,
            correo: &u.correo,
            contrasena: &u.contrasena,
            telefono: u.telefono.as_deref(),
            direccion: u.direccion.as_deref(),
        }
    }
}

/// Full overwrite of every non-key column. `None` writes SQL `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = usuario)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UsuarioChangeset<'a> {
    pub nombre: &'a str,
    pub apellido: &'a str,
    pub correo: &'a str,
    pub contrasena: &'a str,
    pub telefono: Option<&'a str>,
    pub direccion: Option<&'a str>,
}

impl<'a> From<&'a Usuario> for UsuarioChangeset<'a> {
    fn from(u: &'a Usuario) -> Self {
        Self {
            nombre: &u.nombre,
            apellido: &u.apellido,
            correo: &u.correo,
            contrasena: &u.contrasena,
            telefono: u.telefono.as_deref(),
            direccion: u.direccion.as_deref(),
        }
    }
}
