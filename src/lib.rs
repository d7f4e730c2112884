// src/lib.rs

//! Job ad collector library

pub mod error;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
