use crate::cli::run;

mod cache;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod upstream;

fn main() -> anyhow::Result<()> {
    run()
}
