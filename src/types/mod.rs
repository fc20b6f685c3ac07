//! Type definitions for the loan default API

pub mod client;

pub use client::ClientInfo;
