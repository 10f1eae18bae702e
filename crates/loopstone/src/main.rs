use beadstock::design::DesignStore;
use loopstone::config;
use loopstone::gui::app::AppModel;
use loopstone::gui::ring::State;
use loopstone::sys::runtime;
use relm4::prelude::*;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let config = config::load_or_default();

    let store = match DesignStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            log::warn!("Falling back to a local design file: {}", e);
            DesignStore::at(PathBuf::from("loopstone-design.json"))
        }
    };
    let beads = store.load().unwrap_or_default();
    let state = State::new(beads, config.ring.into());

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx.clone());

    let app = RelmApp::new("org.loomworks.loopstone");

    app.run::<AppModel>((state, store, rx));
}
