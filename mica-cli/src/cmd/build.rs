use std::path::Path;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use mica_core::builder::Builder;
use mica_core::model::Site;

use crate::config::Settings;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default: ./mica.yaml)"),
        )
        .arg(
            Arg::new("content")
                .long("content")
                .value_name("DIR")
                .help("Content directory, overrides the config file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory, overrides the config file"),
        )
        .arg(
            Arg::new("assets")
                .long("assets")
                .value_name("DIR")
                .help("Assets directory, overrides the config file"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the site into the output directory")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let settings = Settings::load(args)?;
    build_site(&settings)?;
    Ok(())
}

/// Run one full build with the given settings. Shared with `serve`.
pub fn build_site(settings: &Settings) -> Result<Site> {
    let cfg =
        mica_core::config::load_with_options(Path::new(&settings.config), settings.core_options())?;
    let output_dir = cfg.output_dir.clone();

    let mut builder = Builder::new(cfg);
    builder.set_version(env!("CARGO_PKG_VERSION"));
    let site = builder.build()?;

    println!(
        "Site built successfully in {} ({} pages, {} posts)",
        output_dir,
        site.pages.len(),
        site.posts.len()
    );

    Ok(site)
}
