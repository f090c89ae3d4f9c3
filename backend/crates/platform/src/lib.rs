//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random bytes, Base64url, AEAD sealing)
//! - Password hashing (Argon2id)
//! - Bearer credential extraction from request headers
//! - Key-value storage with per-entry expiry

pub mod bearer;
pub mod crypto;
pub mod kv;
pub mod password;
