use log::{error, info};
use spiral_galaxy::{Galaxy, GalaxyConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let galaxy = match std::env::args().nth(1) {
        Some(path) => match GalaxyConfig::load(&path) {
            Ok(config) => {
                info!("Loaded preset '{}' from {}", config.name, path);
                Galaxy::from_config(config)
            }
            Err(e) => {
                error!("{}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => Galaxy::new(),
    };

    if let Err(e) = galaxy.run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
