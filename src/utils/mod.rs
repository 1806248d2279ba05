// src/utils/mod.rs

pub mod extract;
pub mod hash;
pub mod jwt;
pub mod sanitize;
