//! Diesel table definitions. Must match the deployed `usuario` table.

diesel::table! {
    /// Registered users. `id_usuario` is generated by the database.
    usuario (id_usuario) {
        id_usuario -> Int4,
        #[max_length = 100]
        nombre -> Varchar,
        #[max_length = 100]
        apellido -> Varchar,
        /// Unique per user.
        #[max_length = 150]
        correo -> Varchar,
        #[max_length = 200]
        contrasena -> Varchar,
        #[max_length = 15]
        telefono -> Nullable<Varchar>,
        #[max_length = 200]
        direccion -> Nullable<Varchar>,
    }
}
