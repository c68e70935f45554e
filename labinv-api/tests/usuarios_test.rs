/// User management endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, ASISTENTE_CORREO, AUDITOR_CORREO, PASSWORD};
use labinv_shared::models::user::Role;
use serde_json::json;

#[tokio::test]
async fn test_list_users_excludes_hash() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (status, body) = ctx.json(Method::GET, "/api/usuarios", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(
        users[0],
        json!({ "id": ctx.admin.id, "nombre": "Admin", "correo": "admin@lab.test", "rol": "ADMIN" })
    );
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let ctx = TestContext::new().await;

    for role in [Role::Asistente, Role::Auditor] {
        let cookie = ctx.cookie_for(role).await;

        let (status, _) = ctx.json(Method::GET, "/api/usuarios", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let uri = format!("/api/usuarios/{}", ctx.auditor.id);
        let (status, _) = ctx
            .json(
                Method::PUT,
                &uri,
                Some(&cookie),
                Some(json!({ "nombre": "X", "correo": AUDITOR_CORREO, "rol": "ADMIN" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = ctx.json(Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // Nothing changed
    let (_, body, _) = ctx.login(AUDITOR_CORREO, PASSWORD).await;
    assert_eq!(body["rol"], "AUDITOR");
}

#[tokio::test]
async fn test_update_unknown_role_persists_asistente() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (status, body) = ctx
        .json(
            Method::PUT,
            &format!("/api/usuarios/{}", ctx.auditor.id),
            Some(&cookie),
            Some(json!({ "nombre": "Auditor", "correo": AUDITOR_CORREO, "rol": "SUPERUSER" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, body, _) = ctx.login(AUDITOR_CORREO, PASSWORD).await;
    assert_eq!(body["rol"], "ASISTENTE");
}

#[tokio::test]
async fn test_update_with_blank_password_keeps_hash() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;
    let before = ctx.store.password_hash(ctx.asistente.id).await.unwrap();

    for password in [json!(""), json!("   "), json!(null)] {
        let (_, body) = ctx
            .json(
                Method::PUT,
                &format!("/api/usuarios/{}", ctx.asistente.id),
                Some(&cookie),
                Some(json!({
                    "nombre": "Renombrado",
                    "correo": ASISTENTE_CORREO,
                    "rol": "ASISTENTE",
                    "password": password
                })),
            )
            .await;
        assert_eq!(body["ok"], true);
    }

    assert_eq!(ctx.store.password_hash(ctx.asistente.id).await.unwrap(), before);
    let (_, body, _) = ctx.login(ASISTENTE_CORREO, PASSWORD).await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_update_with_password_rehashes() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (_, body) = ctx
        .json(
            Method::PUT,
            &format!("/api/usuarios/{}", ctx.asistente.id),
            Some(&cookie),
            Some(json!({
                "nombre": "Asistente",
                "correo": ASISTENTE_CORREO,
                "rol": "ASISTENTE",
                "password": "nueva-clave"
            })),
        )
        .await;
    assert_eq!(body["ok"], true);

    let (_, body, _) = ctx.login(ASISTENTE_CORREO, PASSWORD).await;
    assert_eq!(body["msg"], "Contraseña incorrecta");
    let (_, body, _) = ctx.login(ASISTENTE_CORREO, "nueva-clave").await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_update_to_taken_correo_fails() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (status, body) = ctx
        .json(
            Method::PUT,
            &format!("/api/usuarios/{}", ctx.auditor.id),
            Some(&cookie),
            Some(json!({ "nombre": "Auditor", "correo": ASISTENTE_CORREO, "rol": "AUDITOR" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": false, "msg": "Error al actualizar" }));
    assert_eq!(ctx.store.count_users_with_correo(ASISTENTE_CORREO).await, 1);
}

#[tokio::test]
async fn test_missing_ids_are_silent_successes() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (_, body) = ctx
        .json(
            Method::PUT,
            "/api/usuarios/9999",
            Some(&cookie),
            Some(json!({ "nombre": "N", "correo": "n@lab.test", "rol": "ADMIN" })),
        )
        .await;
    assert_eq!(body, json!({ "ok": true }));

    let (_, body) = ctx.json(Method::DELETE, "/api/usuarios/9999", Some(&cookie), None).await;
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_delete_user() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (_, body) = ctx
        .json(
            Method::DELETE,
            &format!("/api/usuarios/{}", ctx.auditor.id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(body, json!({ "ok": true }));

    let (_, body, _) = ctx.login(AUDITOR_CORREO, PASSWORD).await;
    assert_eq!(body["msg"], "Correo no encontrado");
}

#[tokio::test]
async fn test_non_numeric_user_id_is_noop() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (status, body) = ctx
        .json(
            Method::PUT,
            "/api/usuarios/abc",
            Some(&cookie),
            Some(json!({ "nombre": "X", "correo": "x@lab.test", "rol": "ADMIN" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = ctx
        .json(Method::DELETE, "/api/usuarios/abc", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, body) = ctx.json(Method::GET, "/api/usuarios", Some(&cookie), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_with_mistyped_body_is_400_envelope() {
    let ctx = TestContext::new().await;
    let cookie = ctx.cookie_for(Role::Admin).await;

    let (status, body) = ctx
        .json(
            Method::PUT,
            &format!("/api/usuarios/{}", ctx.auditor.id),
            Some(&cookie),
            Some(json!({ "nombre": 5, "correo": "x@lab.test" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "ok": false, "msg": "Faltan datos" }));
}
