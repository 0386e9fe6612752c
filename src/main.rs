//! Binary entry point: resolve settings, start the log, load the catalogue
//! and hand control to the terminal menu until Save & Exit.
use clap::Parser;
use log::info;
use mini_library::{load_store, run_app, App, Args, Config, Outcome};

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse())?;
    // Running without a log is better than not running at all.
    if let Err(err) = config.init_logging() {
        eprintln!("warning: logging disabled: {err:#}");
    }
    info!("starting with data directory {}", config.data_dir.display());

    let store = load_store(&config.data_dir);
    let mut app = App::new(store, config.data_dir.clone());
    run_app(&mut app)?;

    match app.outcome() {
        Some(Outcome::Saved) => println!("Saving... Goodbye"),
        Some(Outcome::Discarded) => println!("Exited without saving."),
        None => {}
    }
    info!("exiting");
    Ok(())
}
