//! Core library for the AI Sudoku solver.
//!
//! This crate is the single source of truth for the solve contract: board
//! model and validation, prompt construction, chat-completion transport,
//! reply parsing, failure taxonomy, and credential storage.
//!
//! No GUI concepts. One outbound request per solve; no retries.

pub mod auth;
pub mod board;
pub mod client;
pub mod error;
pub mod pipeline;

pub use auth::{credentials_file_path, FileKeyStore, KeyStore};
pub use board::{validate_grid, Board};
pub use client::{ChatClient, ChatError, OpenAiClient};
pub use error::SolveError;
pub use pipeline::{build_prompt, solve, SolveResult, SYSTEM_PROMPT};
