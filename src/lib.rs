// Library root
// -----------
// The binary (`main.rs`) is a thin clap adapter over this library.
//
// Module responsibilities:
// - `config`: immutable run configuration, built once at startup.
// - `endpoint`: composes service URLs from the configured base URL.
// - `mime`: layered MIME detection (magic bytes, extension, default).
// - `keys`: publishing-key alphabets, validation, file/env sources.
// - `enumerate`: deduplicated, filtered candidate-file iterator.
// - `api`: blocking HTTP client (key generation, csrf token, publish)
//   and result-key extraction from the HTML responses.
// - `run`: the sequential per-file orchestration loop.
// - `error`: the crate-wide error taxonomy; only `main` converts an
//   error into an exit code.

pub mod api;
pub mod config;
pub mod endpoint;
pub mod enumerate;
pub mod error;
pub mod keys;
pub mod mime;
pub mod run;
