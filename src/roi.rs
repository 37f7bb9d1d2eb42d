use crate::error::{Error, Result};
use crate::points::{Point, ROI_POINTS};
use log::{debug, info};
use opencv::core::{self, Mat, Scalar, Vector};
use opencv::imgproc;
use opencv::prelude::*;

pub const HUE_BINS: i32 = 16;
pub const HUE_CHANNEL: i32 = 0;
/// OpenCV stores 8 bit hue as degrees / 2.
pub const HUE_RANGE: [f32; 2] = [0.0, 180.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Picks the corners of a roughly axis aligned quadrilateral.
    ///
    /// The point with the smallest `x + y` becomes the top left corner and the
    /// one with the largest sum the bottom right corner, the first click wins
    /// on ties. Rotated or concave clicks are not checked and may yield a box
    /// that does not enclose all four points.
    pub fn from_corners(points: &[Point; ROI_POINTS]) -> Self {
        let mut top_left = points[0];
        let mut bottom_right = points[0];
        for point in &points[1..] {
            let sum = point.x + point.y;
            if sum < top_left.x + top_left.y {
                top_left = *point;
            }
            if sum > bottom_right.x + bottom_right.y {
                bottom_right = *point;
            }
        }

        Self::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    pub fn from_rect(rect: core::Rect) -> Self {
        Self::new(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height)
    }

    pub fn to_rect(&self) -> core::Rect {
        core::Rect::new(self.left, self.top, self.width(), self.height())
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    /// Clips the box to a `width` x `height` frame.
    pub fn clamp(&self, width: i32, height: i32) -> Self {
        Self::new(
            self.left.clamp(0, width),
            self.top.clamp(0, height),
            self.right.clamp(0, width),
            self.bottom.clamp(0, height),
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point {
                x: self.left,
                y: self.top,
            },
            Point {
                x: self.right,
                y: self.top,
            },
            Point {
                x: self.right,
                y: self.bottom,
            },
            Point {
                x: self.left,
                y: self.bottom,
            },
        ]
    }
}

/// Hue distribution of the selected region, rescaled into [0, 255].
pub struct ColorHistogram {
    bins: Mat,
}

impl ColorHistogram {
    pub fn as_mat(&self) -> &Mat {
        &self.bins
    }

    pub fn values(&self) -> Result<Vec<f32>> {
        (0..HUE_BINS)
            .map(|bin| -> Result<f32> { Ok(*self.bins.at::<f32>(bin)?) })
            .collect()
    }
}

pub struct RoiModel {
    pub histogram: ColorHistogram,
    pub bounding_box: BoundingBox,
}

pub fn hue_ranges() -> Vector<f32> {
    Vector::<f32>::from_iter(HUE_RANGE)
}

pub fn to_hsv(frame: &Mat) -> Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;
    Ok(hsv)
}

/// Builds the appearance model of the region marked on `frozen`.
pub fn build(points: &[Point; ROI_POINTS], frozen: &Mat) -> Result<RoiModel> {
    let bounding_box = BoundingBox::from_corners(points);
    let crop = bounding_box.clamp(frozen.cols(), frozen.rows());
    if crop.is_empty() {
        return Err(Error::DegenerateRoi(bounding_box));
    }

    let mut mask = Mat::new_rows_cols_with_default(
        frozen.rows(),
        frozen.cols(),
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    imgproc::rectangle(
        &mut mask,
        crop.to_rect(),
        Scalar::all(255.0),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;

    let hsv = to_hsv(frozen)?;
    let mut raw = Mat::default();
    imgproc::calc_hist(
        &Vector::<Mat>::from_iter([hsv]),
        &Vector::<i32>::from_iter([HUE_CHANNEL]),
        &mask,
        &mut raw,
        &Vector::<i32>::from_iter([HUE_BINS]),
        &hue_ranges(),
        false,
    )?;

    let mut bins = Mat::default();
    core::normalize(
        &raw,
        &mut bins,
        0.0,
        255.0,
        core::NORM_MINMAX,
        -1,
        &Mat::default(),
    )?;

    let histogram = ColorHistogram { bins };
    info!("roi selected: {bounding_box:?}");
    debug!("roi hue histogram: {:?}", histogram.values()?);

    Ok(RoiModel {
        histogram,
        bounding_box,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BLUE: (f64, f64, f64) = (255.0, 0.0, 0.0);
    pub(crate) const RED: (f64, f64, f64) = (0.0, 0.0, 255.0);
    pub(crate) const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);

    fn p(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    fn bgr(color: (f64, f64, f64)) -> Scalar {
        Scalar::new(color.0, color.1, color.2, 0.0)
    }

    /// 200x160 frame of `background` with `patch` filled by `fill`.
    pub(crate) fn synthetic_frame(
        background: (f64, f64, f64),
        patch: BoundingBox,
        fill: (f64, f64, f64),
    ) -> Mat {
        let mut frame =
            Mat::new_rows_cols_with_default(160, 200, core::CV_8UC3, bgr(background)).unwrap();
        imgproc::rectangle(
            &mut frame,
            patch.to_rect(),
            bgr(fill),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
        frame
    }

    #[test]
    fn rectangle_corners_in_any_order() {
        let corners = [p(10, 10), p(10, 50), p(50, 10), p(50, 50)];
        let orders = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [1, 3, 0, 2],
            [2, 0, 3, 1],
            [1, 2, 3, 0],
        ];
        for order in orders {
            let points = order.map(|i| corners[i]);
            assert_eq!(
                BoundingBox::from_corners(&points),
                BoundingBox::new(10, 10, 50, 50)
            );
        }
    }

    #[test]
    fn ties_keep_first_click() {
        let first = [p(20, 0), p(10, 10), p(30, 40), p(40, 30)];
        assert_eq!(
            BoundingBox::from_corners(&first),
            BoundingBox::new(20, 0, 30, 40)
        );

        let second = [p(40, 30), p(30, 40), p(10, 10), p(20, 0)];
        assert_eq!(
            BoundingBox::from_corners(&second),
            BoundingBox::new(10, 10, 40, 30)
        );
    }

    #[test]
    fn built_box_is_ordered() {
        let frame = synthetic_frame(BLUE, BoundingBox::new(60, 60, 120, 90), RED);
        let selections = [
            [p(60, 60), p(120, 60), p(120, 90), p(60, 90)],
            [p(5, 150), p(190, 3), p(100, 100), p(0, 0)],
            [p(70, 20), p(20, 70), p(150, 140), p(140, 150)],
        ];
        for points in selections {
            let model = build(&points, &frame).unwrap();
            let b = model.bounding_box;
            assert!(b.left <= b.right);
            assert!(b.top <= b.bottom);
        }
    }

    #[test]
    fn histogram_bins_are_normalized() {
        let mut frame = synthetic_frame(BLUE, BoundingBox::new(40, 40, 100, 100), RED);
        imgproc::rectangle(
            &mut frame,
            BoundingBox::new(70, 40, 100, 70).to_rect(),
            bgr(GREEN),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let points = [p(35, 35), p(105, 35), p(35, 105), p(105, 105)];
        let values = build(&points, &frame).unwrap().histogram.values().unwrap();

        assert_eq!(values.len(), HUE_BINS as usize);
        assert!(values.iter().all(|v| (0.0..=255.0).contains(v)));
        // red dominates the selection, blue and green are present but smaller
        assert_eq!(values[0], 255.0);
        assert!(values[10] > 0.0 && values[10] < 255.0);
        assert!(values[5] > 0.0 && values[5] < 255.0);
    }

    #[test]
    fn out_of_frame_points_are_clipped() {
        let frame = synthetic_frame(BLUE, BoundingBox::new(0, 0, 50, 50), RED);
        let points = [p(-20, -20), p(50, -20), p(-20, 50), p(50, 50)];
        let model = build(&points, &frame).unwrap();
        assert_eq!(model.bounding_box, BoundingBox::new(-20, -20, 50, 50));
        assert_eq!(model.histogram.values().unwrap()[0], 255.0);
    }

    #[test]
    fn collapsed_points_fail() {
        let frame = synthetic_frame(BLUE, BoundingBox::new(60, 60, 120, 90), RED);

        let same_x = [p(40, 10), p(40, 20), p(40, 30), p(40, 60)];
        assert!(matches!(
            build(&same_x, &frame),
            Err(Error::DegenerateRoi(_))
        ));

        let same_y = [p(10, 40), p(30, 40), p(80, 40), p(90, 40)];
        assert!(matches!(
            build(&same_y, &frame),
            Err(Error::DegenerateRoi(_))
        ));

        let inverted = [p(20, 0), p(0, 30), p(20, 0), p(0, 30)];
        assert!(matches!(
            build(&inverted, &frame),
            Err(Error::DegenerateRoi(_))
        ));
    }
}
