// src/models/mod.rs

pub mod course;
pub mod question;
pub mod report;
pub mod test_answer;
pub mod test_attempt;
pub mod user;
