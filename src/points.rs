use log::debug;

/// Number of clicks that make up one region of interest.
pub const ROI_POINTS: usize = 4;

pub type Point = mint::Point2<i32>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Frames are read, tracked and shown.
    #[default]
    Idle,
    /// The frame is frozen and clicks are collected.
    Selecting,
}

/// Collects the corner clicks of one selection session.
#[derive(Debug, Default)]
pub struct PointCollector {
    mode: Mode,
    points: Vec<Point>,
}

impl PointCollector {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            points: Vec::with_capacity(ROI_POINTS),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[cfg(test)]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Starts a new selection session on a cleared buffer.
    pub fn begin(&mut self) {
        self.reset();
        self.mode = Mode::Selecting;
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Abandons the running session without producing a selection.
    pub fn cancel(&mut self) {
        self.reset();
        self.mode = Mode::Idle;
    }

    /// Appends `point` while selecting and returns whether it was taken.
    ///
    /// Coordinates are not validated against the frame size. The fourth
    /// accepted point ends the session.
    pub fn record_click(&mut self, point: Point) -> bool {
        if self.mode != Mode::Selecting || self.points.len() >= ROI_POINTS {
            return false;
        }

        self.points.push(point);
        debug!(
            "roi point {}/{ROI_POINTS} at ({}, {})",
            self.points.len(),
            point.x,
            point.y
        );

        if self.is_complete() {
            self.mode = Mode::Idle;
        }
        true
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == ROI_POINTS
    }

    /// Hands out the finished selection and leaves the buffer empty.
    pub fn take_complete(&mut self) -> Option<[Point; ROI_POINTS]> {
        if !self.is_complete() {
            return None;
        }
        let mut corners = [Point { x: 0, y: 0 }; ROI_POINTS];
        corners.copy_from_slice(&self.points);
        self.reset();
        Some(corners)
    }
}
