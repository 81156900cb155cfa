//! WORM³, a Rubik's cube with wormholes.

#[macro_use]
extern crate lazy_static;

mod cli;
mod display;

const TITLE: &str = "WORM³";

lazy_static! {
    static ref PROGRAM: wormcube_log::Program = wormcube_log::Program {
        name: Some(TITLE.to_string()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };
}

fn main() -> eyre::Result<()> {
    use clap::Parser;

    let args = cli::Args::parse();

    color_eyre::install()?;

    // Initialize logging.
    env_logger::builder().init();

    cli::exec(args)
}
