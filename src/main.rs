#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use anyhow::Result;
use clap::Parser;

mod body;
mod cli;
mod config;
mod constants;
mod ctx;
mod errors;
mod forge;
mod git;
mod mapping;
mod naming;
mod report;
mod stack;
mod subcommands;
mod vcs;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::parse().init_tracing_subscriber()?.run().await
}
