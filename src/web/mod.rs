// src/web/mod.rs
pub mod routes;
pub mod usuario_handlers;
