// src/models/mod.rs
pub mod usuario;
