mod args;
mod capture;
mod error;
mod logging;
mod points;
mod roi;
mod session;
mod tracker;
mod ui;

use anyhow::Context;
use log::{error, info};

const WINDOW_NAME: &str = "camshift-rs";

fn main() -> anyhow::Result<()> {
    let args = args::parse_args();

    logging::setup_logging()?;

    let source = match capture::CaptureSource::open(args.video.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            error!("Could not open video source: {err}");
            return Err(err).context("startup failed");
        }
    };

    let window = ui::HighguiWindow::open(WINDOW_NAME).context("could not open window")?;

    info!("press 'i' to select a region, 'q' to quit");
    let mut session = session::Session::new(source, window, tracker::TrackerConfig::default());
    session.run()?;

    if let Some(track) = session.state().track.as_ref() {
        info!("last tracked window {:?}", track.window());
    }

    Ok(())
}
