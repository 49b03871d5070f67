//! Nyraa headless storefront client.
//!
//! This crate is the storefront without the pixels: the cart, the address
//! book, the checkout flow, and the session against the Nyraa REST backend,
//! exposed as a library so any frontend (the `nyraa` CLI included) can drive
//! it.
//!
//! # Architecture
//!
//! - [`api`] - typed `reqwest` client for the backend REST API
//! - [`store`] - versioned client state persisted to a local JSON file
//! - [`cart`], [`wishlist`], [`addresses`], [`orders`] - domain services over
//!   the state store and API client
//! - [`auth`] - session lifecycle (OTP, password, and Google sign-in)
//! - [`checkout`] - the readiness gate and order submission flow
//!
//! Services are cheap to construct and borrow the shared [`state::Storefront`]
//! resources; nothing here spawns background work.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod orders;
pub mod state;
pub mod store;
pub mod wishlist;

pub use error::{AppError, Result};
pub use state::Storefront;
