// src/models/mod.rs

pub mod comment;
pub mod feed;
pub mod post;
pub mod share;
pub mod user;
