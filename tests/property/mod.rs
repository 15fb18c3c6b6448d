// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties that must hold for every input: path encoding round-trips and
//! dependency ordering of pending changes.

mod dependency_order;
mod path_roundtrip;
