// src/config.rs
use crate::error::{AppError, AppResult};
use std::net::SocketAddr;

const ENDERECO_PADRAO: &str = "0.0.0.0:3000";
const MAX_CONEXOES_PADRAO: u32 = 5;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// String de conexão da base de dados (ex: `sqlite://usuarios.db`).
    pub database_url: String,
    pub addr: SocketAddr,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Lê as variáveis já carregadas (o `.env` é carregado em `main`).
    pub fn from_env() -> AppResult<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let addr_str = std::env::var("APP_ADDR").unwrap_or_else(|_| ENDERECO_PADRAO.to_string());
        let addr = addr_str
            .parse::<SocketAddr>()
            .map_err(|e| AppError::ConfigError(format!("APP_ADDR inválido '{}': {}", addr_str, e)))?;

        let db_max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(valor) => parse_max_conexoes(&valor)?,
            Err(_) => MAX_CONEXOES_PADRAO,
        };

        Ok(Self {
            database_url,
            addr,
            db_max_connections,
        })
    }
}

fn parse_max_conexoes(valor: &str) -> AppResult<u32> {
    match valor.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::ConfigError(format!(
            "DB_MAX_CONNECTIONS deve ser um inteiro positivo, recebido '{}'",
            valor
        ))),
    }
}
