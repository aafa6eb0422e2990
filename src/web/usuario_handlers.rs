// src/web/usuario_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::{FiltroUsuario, IdParams, Usuario, SITUACAO_ATIVO},
    services::usuario_service,
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

/// GET /usuarios e GET /usuarios?id={id}
pub async fn handle_get_usuarios(
    State(state): State<AppState>,
    filtro: Result<Query<FiltroUsuario>, QueryRejection>,
) -> AppResult<Response> {
    let Query(filtro) = filtro?;
    match filtro.id {
        Some(id) => buscar(&state, id).await.map(IntoResponse::into_response),
        None => {
            tracing::debug!("GET /usuarios: listando todos");
            let usuarios = usuario_service::listar(&state.db_pool).await?;
            Ok(Json(usuarios).into_response())
        }
    }
}

/// GET /usuarios/id?id={id} (id obrigatório)
pub async fn handle_buscar_usuario(
    State(state): State<AppState>,
    params: Result<Query<IdParams>, QueryRejection>,
) -> AppResult<Json<Usuario>> {
    let Query(params) = params?;
    buscar(&state, params.id).await
}

async fn buscar(state: &AppState, id: i64) -> AppResult<Json<Usuario>> {
    tracing::debug!("GET /usuarios: buscando {}", id);
    usuario_service::buscar_por_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// POST /usuarios
/// Data e situação de cadastro são sempre definidas pelo servidor.
pub async fn handle_criar_usuario(
    State(state): State<AppState>,
    corpo: Result<Json<Usuario>, JsonRejection>,
) -> AppResult<Json<Usuario>> {
    let Json(mut usuario) = corpo?;
    usuario.data_cadastro = Utc::now();
    usuario.situacao_cadastro = SITUACAO_ATIVO.to_string();

    usuario_service::criar(&state.db_pool, &mut usuario).await?;
    Ok(Json(usuario))
}

/// PUT /usuarios: sem verificação de existência, devolve o próprio corpo.
pub async fn handle_atualizar_usuario(
    State(state): State<AppState>,
    corpo: Result<Json<Usuario>, JsonRejection>,
) -> AppResult<Json<Usuario>> {
    let Json(mut usuario) = corpo?;
    usuario_service::atualizar(&state.db_pool, &mut usuario).await?;
    Ok(Json(usuario))
}

/// DELETE /usuarios?id={id}: 200 mesmo que o id não exista.
pub async fn handle_excluir_usuario(
    State(state): State<AppState>,
    params: Result<Query<IdParams>, QueryRejection>,
) -> AppResult<StatusCode> {
    let Query(params) = params?;
    usuario_service::excluir(&state.db_pool, params.id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::{db::pool_em_memoria, state::AppState, web::routes::create_router};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let db_pool = pool_em_memoria().await;
        create_router(AppState { db_pool })
    }

    async fn enviar(app: &Router, metodo: &str, uri: &str, corpo: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(metodo).uri(uri);
        let request = match corpo {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // Corpo vazio vira Null; texto que não seja JSON vira String
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    fn corpo_usuario() -> Value {
        json!({
            "nome": "Carlos Pereira",
            "email": "carlos@email.com",
            "sexo": "M",
            "cpf": "987.654.321-00",
            "situacaoCadastro": "I",
            "dataCadastro": "2000-01-01T00:00:00Z",
            "contato": { "telefone": "(21) 2222-3333", "celular": "(21) 98888-7777" },
            "enderecosEntrega": [
                { "nomeEndereco": "Casa", "cep": "20040-002", "cidade": "Rio de Janeiro", "estado": "RJ" }
            ],
            "departamentos": [ { "id": 3 } ]
        })
    }

    #[tokio::test]
    async fn listar_sem_usuarios_devolve_lista_vazia() {
        let app = app().await;

        let (status, json) = enviar(&app, "GET", "/usuarios", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn criar_define_situacao_e_data_no_servidor() {
        let app = app().await;

        let (status, json) = enviar(&app, "POST", "/usuarios", Some(corpo_usuario())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["id"].as_i64().unwrap() > 0);
        assert_eq!(json["situacaoCadastro"], "A");
        assert!(!json["dataCadastro"].as_str().unwrap().starts_with("2000"));
        assert!(json["contato"]["id"].as_i64().unwrap() > 0);
        assert!(json["enderecosEntrega"][0]["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn buscar_por_id_devolve_usuario_ou_404() {
        let app = app().await;
        let (_, criado) = enviar(&app, "POST", "/usuarios", Some(corpo_usuario())).await;
        let id = criado["id"].as_i64().unwrap();

        let (status, json) = enviar(&app, "GET", &format!("/usuarios?id={}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["email"], "carlos@email.com");
        assert_eq!(json["departamentos"][0]["nome"], "Logística");

        let (status, json) = enviar(&app, "GET", &format!("/usuarios/id?id={}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], id);

        let (status, json) = enviar(&app, "GET", "/usuarios?id=999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["erro"].is_string());
    }

    #[tokio::test]
    async fn falha_ao_criar_devolve_500_generico() {
        let app = app().await;
        let mut corpo = corpo_usuario();
        corpo["departamentos"] = json!([{ "id": 999 }]);

        let (status, json) = enviar(&app, "POST", "/usuarios", Some(corpo)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["erro"], "Erro ao tentar inserir usuário");
        let (_, lista) = enviar(&app, "GET", "/usuarios", None).await;
        assert_eq!(lista, json!([]));
    }

    #[tokio::test]
    async fn atualizar_devolve_o_corpo_recebido() {
        let app = app().await;
        let (_, mut usuario) = enviar(&app, "POST", "/usuarios", Some(corpo_usuario())).await;
        usuario["nome"] = json!("Carlos P. Pereira");

        let (status, json) = enviar(&app, "PUT", "/usuarios", Some(usuario.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["nome"], "Carlos P. Pereira");
        assert_eq!(json["id"], usuario["id"]);

        let uri = format!("/usuarios?id={}", usuario["id"]);
        let (_, lido) = enviar(&app, "GET", &uri, None).await;
        assert_eq!(lido["nome"], "Carlos P. Pereira");
    }

    #[tokio::test]
    async fn falha_ao_atualizar_tambem_devolve_500() {
        let app = app().await;
        let (_, mut usuario) = enviar(&app, "POST", "/usuarios", Some(corpo_usuario())).await;
        usuario["departamentos"] = json!([{ "id": 999 }]);

        let (status, json) = enviar(&app, "PUT", "/usuarios", Some(usuario)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["erro"], "Erro ao tentar atualizar usuário");
    }

    #[tokio::test]
    async fn excluir_devolve_200_mesmo_sem_usuario() {
        let app = app().await;
        let (_, criado) = enviar(&app, "POST", "/usuarios", Some(corpo_usuario())).await;
        let id = criado["id"].as_i64().unwrap();

        let (status, json) = enviar(&app, "DELETE", &format!("/usuarios?id={}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);

        let (status, _) = enviar(&app, "GET", &format!("/usuarios?id={}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = enviar(&app, "DELETE", &format!("/usuarios/id?id={}", id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn excluir_sem_id_devolve_400() {
        let app = app().await;

        let (status, json) = enviar(&app, "DELETE", "/usuarios", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["erro"].is_string());
    }

    #[tokio::test]
    async fn id_nao_numerico_devolve_400_com_erro_json() {
        let app = app().await;

        let (status, json) = enviar(&app, "GET", "/usuarios?id=abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["erro"].is_string());
    }

    #[tokio::test]
    async fn corpo_invalido_devolve_erro_json() {
        let app = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/usuarios")
            .header("content-type", "application/json")
            .body(Body::from("{nao e json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["erro"].is_string());
    }
}
