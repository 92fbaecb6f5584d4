mod app;
mod behavior;
mod config;
mod mode;
mod navigator;
mod pet;
mod platform;
mod render;
mod shell;
mod timer;

fn main() {
    env_logger::init();
    log::info!("deskpet starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
