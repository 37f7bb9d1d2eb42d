use crate::error::Result;
use crate::points::Point;
use opencv::core::{self, Mat, Scalar, Vector};
use opencv::highgui;
use opencv::imgproc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const MARKER_RADIUS: i32 = 4;
const LINE_THICKNESS: i32 = 2;
const FONT_SCALE: f64 = 0.6;
/// wait_key slice used while blocking for input, so queued clicks are seen.
const BLOCKING_SLICE_MS: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Low byte of the pressed key.
    Key(i32),
    /// Left mouse button press.
    Click(Point),
}

/// Window the session renders into and reads input from.
pub trait Display {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Waits up to `timeout` for one event; `None` waits until one arrives.
    fn poll_input(&mut self, timeout: Option<Duration>) -> Result<Option<InputEvent>>;
}

pub struct HighguiWindow {
    name: String,
    clicks: UnboundedReceiver<Point>,
}

/// Forwards left button presses of a highgui mouse callback to `clicks`.
fn click_forwarder(clicks: UnboundedSender<Point>) -> impl FnMut(i32, i32, i32, i32) {
    move |event, x, y, _flags| {
        if event == highgui::EVENT_LBUTTONDOWN {
            // the receiver only goes away together with the window
            let _ = clicks.send(Point { x, y });
        }
    }
}

impl HighguiWindow {
    pub fn open(name: &str) -> Result<Self> {
        highgui::named_window(
            name,
            highgui::WINDOW_AUTOSIZE | highgui::WINDOW_GUI_NORMAL,
        )?;

        let (click_tx, clicks) = unbounded_channel::<Point>();
        highgui::set_mouse_callback(name, Some(Box::new(click_forwarder(click_tx))))?;

        Ok(Self {
            name: name.to_string(),
            clicks,
        })
    }

    fn next_click(&mut self) -> Option<InputEvent> {
        self.clicks.try_recv().ok().map(InputEvent::Click)
    }
}

impl Display for HighguiWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    fn poll_input(&mut self, timeout: Option<Duration>) -> Result<Option<InputEvent>> {
        let delay = match timeout {
            Some(timeout) => (timeout.as_millis() as i32).max(1),
            None => BLOCKING_SLICE_MS,
        };

        loop {
            if let Some(click) = self.next_click() {
                return Ok(Some(click));
            }

            // mouse callbacks only fire while highgui processes events
            let key = highgui::wait_key(delay)?;
            if key >= 0 {
                return Ok(Some(InputEvent::Key(key & 0xFF)));
            }

            if let Some(click) = self.next_click() {
                return Ok(Some(click));
            }
            if timeout.is_some() {
                return Ok(None);
            }
        }
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}

fn overlay_color() -> Scalar {
    Scalar::new(0f64, 255f64, 0f64, 0f64)
}

fn to_cv(point: Point) -> core::Point {
    core::Point::new(point.x, point.y)
}

/// Draws the closed polygon of a tracked rotated rectangle.
pub fn draw_track(frame: &mut Mat, corners: &[Point; 4]) -> Result<()> {
    let polygon: Vector<core::Point> = corners.iter().copied().map(to_cv).collect();
    imgproc::polylines(
        frame,
        &Vector::<Vector<core::Point>>::from_iter([polygon]),
        true,
        overlay_color(),
        LINE_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

pub fn draw_marker(frame: &mut Mat, point: Point) -> Result<()> {
    imgproc::circle(
        frame,
        to_cv(point),
        MARKER_RADIUS,
        overlay_color(),
        LINE_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

pub fn draw_status(frame: &mut Mat, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    imgproc::put_text(
        frame,
        text,
        core::Point::new(5, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        FONT_SCALE,
        overlay_color(),
        1,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}
