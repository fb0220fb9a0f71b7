//! Integration tests driving whole encounters through the public API

mod common;
mod scenarios;
