//! Clementine storefront library.
//!
//! This crate provides the storefront API as a library, allowing it to be
//! tested in-process and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod fulfillment;
pub mod gateway;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;
