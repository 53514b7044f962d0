mod app;

use engine::run_app;
use tracing::error;

fn main() {
    let wiring = app::build_app();
    if let Err(err) = run_app(wiring.config, wiring.scene) {
        error!(error = %err, "application error");
        std::process::exit(1);
    }
}
