// Copyright 2025 Cornell University
// released under MIT License

pub mod config;
pub mod discover;
pub mod errors;
pub mod naming;
pub mod orchestrator;
pub mod predicates;
pub mod runner;
pub mod tools;
