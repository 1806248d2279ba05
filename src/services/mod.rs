// src/services/mod.rs

pub mod answers;
pub mod attempts;
pub mod scoring;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_support;
