// src/models/mod.rs

pub mod test_paper;
pub mod test_result;
pub mod user;
