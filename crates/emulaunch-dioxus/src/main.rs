use dioxus::prelude::*;
use emulaunch_config::Config;
use emulaunch_engine::io;
use std::process;

mod platform;
mod ui;

use ui::App;

/// Load the config, writing a default one on first run.
fn load_config() -> Config {
    let config_path = Config::config_path();
    log::info!("Config path: {}", config_path.display());

    match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded data dir from config: {}", config.data_dir.display());
            config
        }
        Ok(None) => {
            let config = Config::with_data_dir(Config::default_data_dir());
            log::info!(
                "No config file found, using default data dir {}",
                config.data_dir.display()
            );
            if let Err(e) = config.save() {
                log::warn!("Failed to create default config file: {e}");
                log::warn!("Will use default data dir without persisting config");
            }
            config
        }
        Err(e) => {
            log::error!("Config::load() failed with error: {e}");
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    // Initialize logging
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("Emulaunch"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("emulaunch starting up!");

    // Resolve the data directory before any gating so dialogs can name it
    let config = load_config();
    if let Err(e) = io::validate_data_dir(&config.data_dir) {
        eprintln!(
            "Error: Data directory '{}' is invalid: {e}",
            config.data_dir.display()
        );
        process::exit(1);
    }

    #[cfg(not(target_os = "android"))]
    {
        log::info!("Launching Dioxus app for desktop");
        dioxus::LaunchBuilder::desktop()
            .with_cfg(make_window_config())
            .launch(app_root);
    }

    #[cfg(target_os = "android")]
    {
        log::info!("Launching Dioxus app for Android");
        dioxus::launch(app_root);
    }
}

fn app_root() -> Element {
    // The launcher only hands us a plain fn, so the config is read again here
    let config = Config::load_or_default().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {e}");
        Config::with_data_dir(Config::default_data_dir())
    });

    rsx! {
        App { config }
    }
}

#[cfg(not(target_os = "android"))]
fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("emulaunch")
        .with_always_on_top(false);

    Config::default().with_window(window)
}
