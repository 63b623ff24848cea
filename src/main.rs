//! Binary entry point: read settings, start logging, make sure the table
//! exists, then hand control to the Ratatui event loop.
use bus_reservation_manager::{
    logging, run_app, App, AppConfig, Database, ReservationController, ReservationDao,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        db_path = %config.db_path.display(),
        "bus reservation manager starting"
    );

    let db = Database::new(&config.db_path);
    db.ensure_schema()?;

    let controller = ReservationController::new(ReservationDao::new(db));
    let mut app = App::new(controller);
    run_app(&mut app)
}
