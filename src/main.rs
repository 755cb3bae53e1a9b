//! `skinbone [OPTIONS.toml]`: open the x-ray reveal viewer.

use std::path::Path;

use skinbone::{options::Options, SkinboneError, Viewer};

fn run() -> Result<(), SkinboneError> {
    let options = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {path}");
            Options::load(Path::new(&path))?
        }
        None => Options::default(),
    };
    Viewer::builder().with_options(options).build().run()
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
