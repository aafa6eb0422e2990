// src/web/routes.rs
use crate::{state::AppState, web::usuario_handlers};
use axum::{routing::get, Router};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/usuarios",
            get(usuario_handlers::handle_get_usuarios)
                .post(usuario_handlers::handle_criar_usuario)
                .put(usuario_handlers::handle_atualizar_usuario)
                .delete(usuario_handlers::handle_excluir_usuario),
        )
        // Forma antiga com o segmento "id" (ex: /usuarios/id?id=1)
        .route(
            "/usuarios/id",
            get(usuario_handlers::handle_buscar_usuario)
                .delete(usuario_handlers::handle_excluir_usuario),
        )
        .with_state(app_state)
}
