// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the shopcrawl binary.

pub mod crawl_cmd;
pub mod export_cmd;
pub mod extract_cmd;
pub mod logging;
pub mod output;
pub mod status;
