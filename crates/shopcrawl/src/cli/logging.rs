// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// command output. `RUST_LOG` directives are honoured on top of the default.
pub fn init(verbose: bool, json: bool) -> Result<()> {
    let default = if verbose { "shopcrawl=debug" } else { "shopcrawl=info" };
    let filter = EnvFilter::from_default_env().add_directive(
        default
            .parse()
            .with_context(|| format!("invalid log directive {default}"))?,
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
