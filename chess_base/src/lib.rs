//! # Base types for castellan
//!
//! This is an auxiliary crate for `castellan`, which contains the coordinate and piece types.
//!
//! Normally you don't want to use this crate directly. Use `castellan` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
