//! Tests for the `Usuario` CRUD service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::TraceId;
use crate::domain::ports::StoreSession;
use crate::outbound::memory::{InMemoryStore, StoreOperation};

type Store = InMemoryStore<Usuario>;

struct Harness {
    store: Arc<Store>,
    service: UsuarioCrudService<Store>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    Harness {
        service: UsuarioCrudService::new(Arc::clone(&store)),
        store,
    }
}

fn ana() -> UsuarioDto {
    UsuarioDto {
        nombre: Some("Ana".to_owned()),
        apellido: Some("Ruiz".to_owned()),
        correo: Some("ana@x.com".to_owned()),
        contrasena: Some("p1".to_owned()),
        telefono: Some("555-0101".to_owned()),
        ..UsuarioDto::default()
    }
}

async fn create_ana(service: &UsuarioCrudService<Store>) -> i32 {
    let created = service.create(Some(ana())).await;
    assert_eq!(created.response_code(), ResponseCode::Created);
    created.data().map(|dto| dto.id_usuario).expect("created payload")
}

#[rstest]
#[case(CrudStage::Started, CrudStage::Validated, true)]
#[case(CrudStage::Started, CrudStage::Failed, true)]
#[case(CrudStage::Validated, CrudStage::Persisted, true)]
#[case(CrudStage::Validated, CrudStage::Failed, true)]
#[case(CrudStage::Persisted, CrudStage::Completed, true)]
#[case(CrudStage::Failed, CrudStage::Completed, true)]
#[case(CrudStage::Started, CrudStage::Persisted, false)]
#[case(CrudStage::Started, CrudStage::Completed, false)]
#[case(CrudStage::Persisted, CrudStage::Failed, false)]
#[case(CrudStage::Completed, CrudStage::Started, false)]
fn stage_transitions(#[case] from: CrudStage, #[case] to: CrudStage, #[case] legal: bool) {
    assert_eq!(from.can_advance_to(to), legal);
}

#[rstest]
#[tokio::test]
async fn create_echoes_generated_identity(harness: Harness) {
    let result = harness.service.create(Some(ana())).await;

    assert_eq!(result.response_code(), ResponseCode::Created);
    assert!(result.is_success());
    let dto = result.data().expect("payload");
    assert!(dto.id_usuario > 0);
    assert_eq!(dto.correo.as_deref(), Some("ana@x.com"));
    assert!(dto.contrasena.is_none());

    let fetched = harness.service.get_by_id(dto.id_usuario).await;
    assert_eq!(fetched.response_code(), ResponseCode::Ok);
    assert_eq!(fetched.data(), Some(dto));
}

#[rstest]
#[tokio::test]
async fn create_without_payload_is_bad_request(harness: Harness) {
    harness.store.fail_next(StoreOperation::Begin, "must not be reached").await;

    let result = harness.service.create(None).await;

    assert_eq!(result.response_code(), ResponseCode::BadRequest);
    assert!(!result.is_success());
    assert!(result.data().is_none());
    assert_eq!(
        result.message(),
        Some("No se puede cargar un dato vacío en la base de datos")
    );
    // The armed fault is still pending, so the store was never touched.
    let mut session = harness.store.open().await.expect("open");
    assert!(session.begin().await.is_err());
}

#[rstest]
#[case::empty(UsuarioDto::default())]
#[case::missing_contrasena(UsuarioDto { contrasena: None, ..ana() })]
#[case::overlong_nombre(UsuarioDto { nombre: Some("a".repeat(101)), ..ana() })]
#[tokio::test]
async fn create_with_invalid_payload_is_bad_request(harness: Harness, #[case] dto: UsuarioDto) {
    harness.store.fail_next(StoreOperation::Begin, "must not be reached").await;

    let result = harness.service.create(Some(dto)).await;

    assert_eq!(result.response_code(), ResponseCode::BadRequest);
    assert!(result.data().is_none());
    assert!(harness.store.rows().await.is_empty());
    let mut session = harness.store.open().await.expect("open");
    assert!(session.begin().await.is_err());
}

#[rstest]
#[tokio::test]
async fn create_that_persists_nothing_is_internal_error(harness: Harness) {
    harness.store.ignore_next(StoreOperation::Insert).await;

    let result = harness.service.create(Some(ana())).await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    assert_eq!(
        result.message(),
        Some("No se ha podido guardar correctamente la información")
    );
    assert!(harness.store.rows().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn create_store_failure_keeps_diagnostic(harness: Harness) {
    harness.store.fail_next(StoreOperation::Insert, "connection reset").await;

    let result = harness.service.create(Some(ana())).await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    let errors = result.errors().expect("diagnostics");
    assert!(errors.iter().any(|e| e.contains("connection reset")), "{errors:?}");
    assert!(harness.store.rows().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_correo(harness: Harness) {
    create_ana(&harness.service).await;

    let result = harness.service.create(Some(ana())).await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    assert_eq!(harness.store.rows().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn get_by_id_missing_is_not_found(harness: Harness) {
    let result = harness.service.get_by_id(404).await;

    assert_eq!(result.response_code(), ResponseCode::NotFound);
    assert!(result.data().is_none());
    assert_eq!(result.message(), Some("Usuario no encontrado."));
}

#[rstest]
#[tokio::test]
async fn get_all_empty_is_not_found(harness: Harness) {
    let result = harness.service.get_all().await;

    assert_eq!(result.response_code(), ResponseCode::NotFound);
    assert_eq!(result.message(), Some("No se encontraron usuarios."));
}

#[rstest]
#[tokio::test]
async fn get_all_lists_without_passwords(harness: Harness) {
    create_ana(&harness.service).await;
    let luis = UsuarioDto {
        nombre: Some("Luis".to_owned()),
        correo: Some("luis@x.com".to_owned()),
        ..ana()
    };
    harness.service.create(Some(luis)).await;

    let result = harness.service.get_all().await;

    assert_eq!(result.response_code(), ResponseCode::Ok);
    let list = result.data().expect("payload");
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|dto| dto.contrasena.is_none()));
}

#[rstest]
#[tokio::test]
async fn read_failures_are_internal_errors(harness: Harness) {
    harness.store.fail_next(StoreOperation::Query, "timeout").await;

    let result = harness.service.get_all().await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    assert_eq!(
        result.message(),
        Some("Ocurrió un error al intentar obtener los usuarios.")
    );
    assert!(result.errors().is_some());
}

#[rstest]
#[tokio::test]
async fn partial_update_preserves_empty_fields(harness: Harness) {
    let id = create_ana(&harness.service).await;
    let patch = UsuarioDto {
        nombre: Some("Ana Maria".to_owned()),
        correo: Some(String::new()),
        ..UsuarioDto::default()
    };

    let result = harness
        .service
        .update(id, Some(patch), UpdateMode::Partial)
        .await;

    assert_eq!(result.response_code(), ResponseCode::Ok);
    let fetched = harness.service.get_by_id(id).await;
    let dto = fetched.data().expect("payload");
    assert_eq!(dto.nombre.as_deref(), Some("Ana Maria"));
    assert_eq!(dto.correo.as_deref(), Some("ana@x.com"));
    assert_eq!(dto.telefono.as_deref(), Some("555-0101"));
}

#[rstest]
#[tokio::test]
async fn full_update_overwrites_every_field(harness: Harness) {
    let id = create_ana(&harness.service).await;
    let replacement = UsuarioDto {
        nombre: Some("Ana".to_owned()),
        apellido: Some("Gil".to_owned()),
        correo: Some("ana@y.com".to_owned()),
        contrasena: Some("p2".to_owned()),
        ..UsuarioDto::default()
    };

    let result = harness
        .service
        .update(id, Some(replacement), UpdateMode::Full)
        .await;

    assert_eq!(result.response_code(), ResponseCode::Ok);
    let dto = result.data().expect("payload");
    assert_eq!(dto.id_usuario, id);
    assert_eq!(dto.apellido.as_deref(), Some("Gil"));
    assert!(dto.telefono.is_none());
    assert!(dto.contrasena.is_none());
    let stored = harness.store.rows().await;
    assert_eq!(stored.first().map(|u| u.contrasena.as_str()), Some("p2"));
}

#[rstest]
#[tokio::test]
async fn full_update_that_empties_required_fields_is_rejected(harness: Harness) {
    let id = create_ana(&harness.service).await;
    let before = harness.store.rows().await;

    let result = harness
        .service
        .update(id, Some(UsuarioDto::default()), UpdateMode::Full)
        .await;

    assert_eq!(result.response_code(), ResponseCode::BadRequest);
    assert!(
        result
            .message()
            .is_some_and(|m| m.starts_with("Los datos del usuario no son válidos")),
        "{:?}",
        result.message()
    );
    assert_eq!(harness.store.rows().await, before);
}

#[rstest]
#[tokio::test]
async fn partial_update_with_overlong_value_is_bad_request(harness: Harness) {
    let id = create_ana(&harness.service).await;
    let before = harness.store.rows().await;
    let dto = UsuarioDto {
        telefono: Some("5".repeat(16)),
        ..UsuarioDto::default()
    };

    let result = harness.service.update(id, Some(dto), UpdateMode::Partial).await;

    assert_eq!(result.response_code(), ResponseCode::BadRequest);
    assert_eq!(harness.store.rows().await, before);
}

#[rstest]
#[case::missing_row(Some(UsuarioDto::default()), ResponseCode::NotFound)]
#[case::missing_body(None, ResponseCode::BadRequest)]
#[tokio::test]
async fn update_rejections(
    harness: Harness,
    #[case] dto: Option<UsuarioDto>,
    #[case] expected: ResponseCode,
) {
    let result = harness.service.update(77, dto, UpdateMode::Partial).await;
    assert_eq!(result.response_code(), expected);
    assert!(result.data().is_none());
}

#[rstest]
#[tokio::test]
async fn update_store_failure_leaves_row_unchanged(harness: Harness) {
    let id = create_ana(&harness.service).await;
    let before = harness.store.rows().await;
    harness.store.fail_next(StoreOperation::Update, "lock timeout").await;

    let patch = UsuarioDto {
        nombre: Some("Otra".to_owned()),
        ..UsuarioDto::default()
    };
    let result = harness.service.update(id, Some(patch), UpdateMode::Partial).await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    assert_eq!(harness.store.rows().await, before);
}

#[rstest]
#[tokio::test]
async fn delete_removes_and_omits_payload(harness: Harness) {
    let id = create_ana(&harness.service).await;

    let result = harness.service.delete(id).await;

    assert_eq!(result.response_code(), ResponseCode::Ok);
    assert!(result.is_success());
    assert!(result.data().is_none());
    assert_eq!(
        result.message(),
        Some("El usuario ha sido eliminado correctamente.")
    );
    let after = harness.service.get_by_id(id).await;
    assert_eq!(after.response_code(), ResponseCode::NotFound);

    let again = harness.service.delete(id).await;
    assert_eq!(again.response_code(), ResponseCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_failure_leaves_row_in_place(harness: Harness) {
    let id = create_ana(&harness.service).await;
    harness.store.fail_next(StoreOperation::Commit, "disk full").await;

    let result = harness.service.delete(id).await;

    assert_eq!(result.response_code(), ResponseCode::InternalServerError);
    assert_eq!(result.message(), Some("Error al eliminar el usuario."));
    assert_eq!(harness.store.rows().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn summaries_carry_identity_name_and_email(harness: Harness) {
    let id = create_ana(&harness.service).await;

    let one = harness.service.get_summary_by_id(id).await;
    assert_eq!(
        one.data(),
        Some(&UsuarioDto {
            id_usuario: id,
            nombre: Some("Ana".to_owned()),
            correo: Some("ana@x.com".to_owned()),
            ..UsuarioDto::default()
        })
    );

    let all = harness.service.get_all_summaries().await;
    assert_eq!(all.data().map(Vec::len), Some(1));

    let missing = harness.service.get_summary_by_id(id + 1).await;
    assert_eq!(missing.response_code(), ResponseCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn results_carry_the_scoped_trace_id(harness: Harness) {
    let trace_id = TraceId::generate();
    let result = TraceId::scope(trace_id, harness.service.get_all()).await;
    assert_eq!(result.trace_id(), Some(trace_id.to_string().as_str()));
}
