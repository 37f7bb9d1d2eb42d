use crate::capture::FrameSource;
use crate::error::{Error, Result};
use crate::points::{Mode, PointCollector, ROI_POINTS};
use crate::roi;
use crate::tracker::{TrackState, TrackerConfig};
use crate::ui::{self, Display, InputEvent};
use log::{debug, info, warn};
use opencv::core::Mat;
use opencv::prelude::*;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(1);
const ESCAPE: i32 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnterSelection,
    CancelSelection,
    Quit,
}

impl Command {
    pub fn from_key(key: i32) -> Option<Self> {
        match key {
            k if k == 'i' as i32 => Some(Self::EnterSelection),
            k if k == 'q' as i32 => Some(Self::Quit),
            ESCAPE => Some(Self::CancelSelection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Stopped,
}

/// Everything the loop mutates between frames.
#[derive(Default)]
pub struct SessionState {
    pub points: PointCollector,
    pub track: Option<TrackState>,
}

impl SessionState {
    pub fn mode(&self) -> Mode {
        self.points.mode()
    }
}

pub struct Session<S: FrameSource, D: Display> {
    source: S,
    display: D,
    config: TrackerConfig,
    state: SessionState,
}

impl<S: FrameSource, D: Display> Session<S, D> {
    pub fn new(source: S, display: D, config: TrackerConfig) -> Self {
        Self {
            source,
            display,
            config,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        while self.step()? == Status::Running {}
        Ok(())
    }

    /// Reads, tracks and shows one frame, then handles at most one input event.
    pub fn step(&mut self) -> Result<Status> {
        let Some(frame) = self.source.read()? else {
            info!("end of stream");
            return Ok(Status::Stopped);
        };

        if let Some(track) = self.state.track.as_mut() {
            track.update(&frame)?;
            let mut canvas = frame.try_clone()?;
            ui::draw_track(&mut canvas, &track.corners())?;
            self.display.show(&canvas)?;
        } else {
            self.display.show(&frame)?;
        }

        match self.display.poll_input(Some(POLL_INTERVAL))? {
            Some(InputEvent::Key(key)) => match Command::from_key(key) {
                Some(Command::EnterSelection)
                    if self.state.mode() == Mode::Idle && !self.state.points.is_complete() =>
                {
                    return self.select_roi(&frame);
                }
                Some(Command::Quit) => {
                    info!("stop requested by user");
                    return Ok(Status::Stopped);
                }
                _ => {}
            },
            Some(InputEvent::Click(point)) => {
                self.state.points.record_click(point);
            }
            None => {}
        }

        Ok(Status::Running)
    }

    /// Collects four clicks on `frozen` and replaces the track.
    ///
    /// No frames are read until the selection ends. A degenerate selection
    /// restarts on the same frame and leaves the previous track in place.
    fn select_roi(&mut self, frozen: &Mat) -> Result<Status> {
        info!("select {ROI_POINTS} roi corners");
        self.state.points.begin();
        let mut preview = selection_preview(frozen)?;

        loop {
            self.display.show(&preview)?;

            match self.display.poll_input(None)? {
                Some(InputEvent::Click(point)) => {
                    if self.state.points.record_click(point) {
                        ui::draw_marker(&mut preview, point)?;
                    }
                }
                Some(InputEvent::Key(key)) => match Command::from_key(key) {
                    Some(Command::CancelSelection) => {
                        info!("roi selection cancelled");
                        self.state.points.cancel();
                        return Ok(Status::Running);
                    }
                    Some(Command::Quit) => {
                        info!("stop requested by user");
                        return Ok(Status::Stopped);
                    }
                    _ => {}
                },
                None => {}
            }

            let Some(corners) = self.state.points.take_complete() else {
                continue;
            };

            match roi::build(&corners, frozen) {
                Ok(model) => {
                    self.state.track = Some(TrackState::new(model, &self.config)?);
                    debug!("tracking started");
                    return Ok(Status::Running);
                }
                Err(Error::DegenerateRoi(bounding_box)) => {
                    warn!("roi {bounding_box:?} encloses no pixels, select again");
                    self.state.points.begin();
                    preview = selection_preview(frozen)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn selection_preview(frozen: &Mat) -> Result<Mat> {
    let mut preview = frozen.try_clone()?;
    ui::draw_status(&mut preview, "Select Tracking Region")?;
    Ok(preview)
}
