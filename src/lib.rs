//! Folio: a server-rendered blog front end backed by a remote blog API.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
