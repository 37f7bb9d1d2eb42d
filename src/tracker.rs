use crate::error::Result;
use crate::points::Point;
use crate::roi::{self, BoundingBox, ColorHistogram, RoiModel, HUE_CHANNEL};
use log::debug;
use opencv::core::{self, Mat, TermCriteria, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use opencv::video;

/// Termination criteria of the CamShift search, whichever triggers first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub max_iterations: i32,
    pub epsilon: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            epsilon: 1.0,
        }
    }
}

impl TrackerConfig {
    pub fn criteria(&self) -> Result<TermCriteria> {
        Ok(TermCriteria::new(
            core::TermCriteria_COUNT + core::TermCriteria_EPS,
            self.max_iterations,
            self.epsilon,
        )?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackUpdate {
    /// Axis aligned search window that seeds the next frame.
    pub window: BoundingBox,
    /// Vertices of the rotated rectangle found on this frame.
    pub corners: [Point; 4],
}

/// The one live track: search window, appearance model and last geometry.
pub struct TrackState {
    histogram: ColorHistogram,
    window: BoundingBox,
    corners: [Point; 4],
    criteria: TermCriteria,
}

impl TrackState {
    pub fn new(model: RoiModel, config: &TrackerConfig) -> Result<Self> {
        Ok(Self {
            histogram: model.histogram,
            window: model.bounding_box,
            corners: model.bounding_box.corners(),
            criteria: config.criteria()?,
        })
    }

    pub fn window(&self) -> BoundingBox {
        self.window
    }

    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    /// Relocates the region on `frame` and keeps the result as the next seed.
    pub fn update(&mut self, frame: &Mat) -> Result<TrackUpdate> {
        let update = camshift(frame, self.window, &self.histogram, self.criteria)?;
        self.window = update.window;
        self.corners = update.corners;
        Ok(update)
    }
}

/// Runs one CamShift search over the hue back-projection of `frame`.
///
/// A frame without matching pixels is not an error, the returned window
/// simply stops following the object.
pub fn camshift(
    frame: &Mat,
    previous: BoundingBox,
    histogram: &ColorHistogram,
    criteria: TermCriteria,
) -> Result<TrackUpdate> {
    let seed = previous.clamp(frame.cols(), frame.rows());
    if seed.is_empty() {
        debug!("search window {previous:?} collapsed, keeping it");
        return Ok(TrackUpdate {
            window: previous,
            corners: previous.corners(),
        });
    }

    let hsv = roi::to_hsv(frame)?;
    let mut back_projection = Mat::default();
    imgproc::calc_back_project(
        &Vector::<Mat>::from_iter([hsv]),
        &Vector::<i32>::from_iter([HUE_CHANNEL]),
        histogram.as_mat(),
        &mut back_projection,
        &roi::hue_ranges(),
        1.0,
    )?;

    let mut window = seed.to_rect();
    let rotated = video::cam_shift(&back_projection, &mut window, criteria)?;
    let lost = rotated.size.width == 0.0 && rotated.size.height == 0.0;

    let mut vertices = Mat::default();
    imgproc::box_points(rotated, &mut vertices)?;
    let mut corners = [Point { x: 0, y: 0 }; 4];
    for (row, corner) in corners.iter_mut().enumerate() {
        corner.x = *vertices.at_2d::<f32>(row as i32, 0)? as i32;
        corner.y = *vertices.at_2d::<f32>(row as i32, 1)? as i32;
    }

    let window = BoundingBox::from_rect(window);
    if lost {
        debug!("no matching pixels around {seed:?}");
    } else {
        debug!("track window {window:?}");
    }

    Ok(TrackUpdate { window, corners })
}
