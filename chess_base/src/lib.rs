//! # Base types for gambit
//!
//! This is an auxiliary crate for `gambit` with the plain value types. It is split from the main crate,
//! so everything declared here can be used in the build script for `gambit`.
//!
//! Normally you don't want to use this crate directly. Use `gambit` instead.

pub mod bitboard;
pub mod bitboard_consts;
pub mod geometry;
pub mod types;
