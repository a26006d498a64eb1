use std::env;

use anyhow::Result;
use log::info;

use shadowbloom::config::USAGE;
use shadowbloom::logging::{init_logging, LoggingConfig};
use shadowbloom::{print_summary, run_interactive, CliOptions, Scene, WindowInitError};

fn main() {
    init_logging(LoggingConfig::default());
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = options.resolve()?;
    let mut scene = Scene::demo(&config);
    options.apply_tunables(&mut scene.tunables);

    if options.summary_only {
        print_summary(&scene);
        return Ok(());
    }

    info!("opening {}x{} window", config.width, config.height);
    let fallback = scene.clone();
    match run_interactive(config, scene) {
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or WAYLAND_DISPLAY to enable rendering)."
            );
            print_summary(&fallback);
            Ok(())
        }
        other => other,
    }
}
