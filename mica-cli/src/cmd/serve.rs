use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use mica_dev_server::{DevServer, ServerConfig};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};

use crate::cmd::build::{add_build_args, build_site};
use crate::config::Settings;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Build the site and serve it locally, rebuilding on changes")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on (default: 8080)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to (default: 127.0.0.1)"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let settings = Settings::load(args)?;

    // Initial build; the server needs the resolved output dir before it starts
    let cfg =
        mica_core::config::load_with_options(Path::new(&settings.config), settings.core_options())?;
    let output_dir = PathBuf::from(&cfg.output_dir);
    build_site(&settings)?;

    let server_config = ServerConfig {
        host: settings.host.clone(),
        port: settings.port,
        root: output_dir,
        open: settings.open,
    };

    let server_handle = tokio::spawn(async move {
        if let Err(e) = DevServer::new(server_config).run().await {
            eprintln!("Dev server error: {}", e);
        }
    });

    let watcher_settings = settings.clone();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_and_rebuild(watcher_settings).await {
            eprintln!("Watcher error: {}", e);
        }
    });

    let _ = tokio::try_join!(server_handle, watcher_handle)?;

    Ok(())
}

async fn watch_and_rebuild(settings: Settings) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    // The content dir can change between rebuilds only via the config file,
    // so resolve both once up front.
    let cfg =
        mica_core::config::load_with_options(Path::new(&settings.config), settings.core_options())?;
    let content_dir = PathBuf::from(&cfg.content_dir);
    let config_file = PathBuf::from(&settings.config);

    debouncer
        .watcher()
        .watch(&content_dir, notify::RecursiveMode::Recursive)?;
    println!("Watching content directory: {}", content_dir.display());

    if config_file.exists() {
        debouncer
            .watcher()
            .watch(&config_file, notify::RecursiveMode::NonRecursive)?;
        println!("Watching config file: {}", config_file.display());
    }

    while let Some(path) = rx.recv().await {
        println!("Changed: {}", path.display());

        match build_site(&settings) {
            Ok(_) => println!("Site rebuilt successfully"),
            Err(e) => eprintln!("Build error: {}", e),
        }
    }

    Ok(())
}
