// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output mode flags shared by every command.
//!
//! The global `--json` and `--quiet` flags are exported as
//! `SHOPCRAWL_*` environment variables by `main` so any command can check
//! them without threading arguments through.

use serde::Serialize;

pub const ENV_JSON: &str = "SHOPCRAWL_JSON";
pub const ENV_QUIET: &str = "SHOPCRAWL_QUIET";

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

pub fn is_json() -> bool {
    flag(ENV_JSON)
}

pub fn is_quiet() -> bool {
    flag(ENV_QUIET) || is_json()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to encode output: {e}"),
    }
}
