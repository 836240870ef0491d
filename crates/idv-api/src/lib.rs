//! # idv-api
//!
//! HTTP API layer for identity-redirect-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Publishable key and payment intent endpoints
//! - Webhook handler for Stripe Identity events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Web client |
//! | GET | `/health` | Health check |
//! | GET | `/config` | Publishable key |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/webhook` | Stripe webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
