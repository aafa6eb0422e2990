// src/services/mod.rs
pub mod usuario_service;
