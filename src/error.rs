// src/error.rs
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Operação de escrita que falhou (define a mensagem devolvida ao cliente).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operacao {
    Inserir,
    Atualizar,
    Excluir,
}

impl fmt::Display for Operacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbo = match self {
            Operacao::Inserir => "inserir",
            Operacao::Atualizar => "atualizar",
            Operacao::Excluir => "excluir",
        };
        f.write_str(verbo)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    ConfigError(String),

    #[error("Usuário não encontrado")]
    NotFound,

    #[error("Parâmetros inválidos: {0}")]
    QueryInvalida(#[from] QueryRejection),

    #[error("Corpo da requisição inválido: {0}")]
    CorpoInvalido(#[from] JsonRejection),

    // Falha numa escrita (transação já desfeita quando aplicável)
    #[error("Falha ao {operacao} usuário: {source}")]
    Persistencia {
        operacao: Operacao,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn persistencia(operacao: Operacao) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Persistencia { operacao, source }
    }
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, mensagem) = match &self {
            AppError::NotFound => {
                tracing::debug!("Recurso não encontrado");
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::QueryInvalida(rejeicao) => {
                tracing::debug!("Query rejeitada: {}", rejeicao);
                (rejeicao.status(), rejeicao.body_text())
            }
            AppError::CorpoInvalido(rejeicao) => {
                tracing::debug!("Corpo rejeitado: {}", rejeicao);
                (rejeicao.status(), rejeicao.body_text())
            }
            AppError::Persistencia { operacao, .. } => {
                tracing::error!("Erro processado: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Erro ao tentar {} usuário", operacao),
                )
            }
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                tracing::error!("Erro processado: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao aceder aos dados.".to_string())
            }
            AppError::EnvVarError(_) | AppError::ConfigError(_) => {
                tracing::error!("Erro processado: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro de configuração.".to_string())
            }
        };

        (status, Json(json!({ "erro": mensagem }))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
