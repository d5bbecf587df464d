use dioxus::launch;
use dioxus_logger::tracing::Level;

use earnings_ui::App;

fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    dioxus_logger::init(Level::INFO).ok();

    launch(App);
}
