// Copyright 2026 TruCite Contributors
// SPDX-License-Identifier: Apache-2.0

//! TruCite runtime library — truth gate for AI-generated text.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(
    dead_code,
    unused_imports,
    clippy::new_without_default,
    clippy::should_implement_trait
)]

pub mod audit;
pub mod claims;
pub mod cli;
pub mod client;
pub mod events;
pub mod evidence;
pub mod policy;
pub mod protocol;
pub mod rest;
pub mod scoring;
pub mod server;
pub mod session;
