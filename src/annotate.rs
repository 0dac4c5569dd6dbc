// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame compositing: person-center markers, joint dots, and translucent
//! limb overlays.
//!
//! Poses and centers carry (row, col) coordinates; drawing calls take pixel
//! (x, y) = (col * scale, row * scale). That swap mirrors the upstream
//! pipeline and is pinned by tests rather than normalized.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::pose::{LIMBS, PersonCenter, Pose};

/// Person-center marker color (yellow).
const CENTER_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const CENTER_RADIUS: i32 = 5;

/// Joint marker color (black).
const JOINT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const JOINT_RADIUS: i32 = 3;

/// Half-width of a limb oval, in pixels.
const STICK_WIDTH: f32 = 6.0;

/// Overlay opacity of a limb segment (blend is overlay * 0.6 + frame * 0.4).
const LIMB_ALPHA: f32 = 0.6;

/// Boundary samples per limb oval.
const OVAL_STEPS: usize = 36;

/// Composite centers and skeletons onto `frame` in place.
///
/// `scale` is the ratio of the frame height to the 368-unit processing
/// resolution. Drawing clips at the frame bounds; joints flagged with the
/// NaN sentinel are skipped.
pub fn draw_overlays(frame: &mut RgbImage, scale: f32, centers: &[PersonCenter], poses: &[Pose]) {
    for center in centers {
        draw_filled_circle_mut(
            frame,
            (to_px(center.col * scale), to_px(center.row * scale)),
            CENTER_RADIUS,
            CENTER_COLOR,
        );
    }

    for pose in poses {
        for &(row, col) in pose.joints() {
            if !row.is_finite() || !col.is_finite() {
                continue;
            }
            draw_filled_circle_mut(
                frame,
                (to_px(col * scale), to_px(row * scale)),
                JOINT_RADIUS,
                JOINT_COLOR,
            );
        }

        for limb in &LIMBS {
            let a = pose.joint(limb.from);
            let b = pose.joint(limb.to);
            if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
                continue;
            }
            draw_limb(frame, scale, a, b, limb.color);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_px(v: f32) -> i32 {
    v as i32
}

/// Draw one translucent limb oval between two (row, col) joints.
fn draw_limb(frame: &mut RgbImage, scale: f32, a: (f32, f32), b: (f32, f32), color: [u8; 3]) {
    let (row_a, col_a) = (a.0 * scale, a.1 * scale);
    let (row_b, col_b) = (b.0 * scale, b.1 * scale);
    let mid = ((col_a + col_b) / 2.0, (row_a + row_b) / 2.0);
    let d_row = row_a - row_b;
    let d_col = col_a - col_b;
    let length = d_row.hypot(d_col);
    // A zero-length limb has no orientation; default to angle 0 and let the
    // polygon degenerate to a point-like shape.
    let angle = if length == 0.0 { 0.0 } else { d_row.atan2(d_col) };

    let polygon = oval_polygon(mid, length / 2.0, STICK_WIDTH, angle);
    if polygon.len() < 3 {
        return;
    }
    blend_polygon(frame, &polygon, color);
}

/// Sampled boundary of an oval with semi-axes (a, b) rotated by `angle`,
/// centred at `(x, y)` pixel coordinates. Consecutive duplicates (and a
/// closing point equal to the first) are dropped so the polygon fill
/// accepts it.
fn oval_polygon(center: (f32, f32), a: f32, b: f32, angle: f32) -> Vec<Point<i32>> {
    let (sin, cos) = angle.sin_cos();
    let mut points: Vec<Point<i32>> = Vec::with_capacity(OVAL_STEPS);
    for step in 0..OVAL_STEPS {
        #[allow(clippy::cast_precision_loss)]
        let t = step as f32 * std::f32::consts::TAU / OVAL_STEPS as f32;
        let (ex, ey) = (a * t.cos(), b * t.sin());
        let x = ex.mul_add(cos, -(ey * sin)) + center.0;
        let y = ex.mul_add(sin, ey * cos) + center.1;
        #[allow(clippy::cast_possible_truncation)]
        let point = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Fill `polygon` with `color` on a scratch copy, then blend the scratch
/// back over the frame at fixed opacity. Only the polygon's bounding region
/// needs blending; pixels outside it are identical in both copies.
fn blend_polygon(frame: &mut RgbImage, polygon: &[Point<i32>], color: [u8; 3]) {
    let mut scratch = frame.clone();
    draw_polygon_mut(&mut scratch, polygon, Rgb(color));

    let (width, height) = frame.dimensions();
    #[allow(clippy::cast_possible_wrap)]
    let (max_x, max_y) = (width as i32 - 1, height as i32 - 1);
    let x0 = polygon.iter().map(|p| p.x).min().unwrap_or(0).max(0);
    let y0 = polygon.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let x1 = polygon.iter().map(|p| p.x).max().unwrap_or(-1).min(max_x);
    let y1 = polygon.iter().map(|p| p.y).max().unwrap_or(-1).min(max_y);
    if x0 > x1 || y0 > y1 {
        return;
    }

    #[allow(clippy::cast_sign_loss)]
    for y in y0 as u32..=y1 as u32 {
        #[allow(clippy::cast_sign_loss)]
        for x in x0 as u32..=x1 as u32 {
            let base = frame.get_pixel(x, y).0;
            let over = scratch.get_pixel(x, y).0;
            let mut blended = [0u8; 3];
            for ch in 0..3 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    blended[ch] = f32::from(base[ch])
                        .mul_add(1.0 - LIMB_ALPHA, f32::from(over[ch]) * LIMB_ALPHA)
                        .round() as u8;
                }
            }
            frame.put_pixel(x, y, Rgb(blended));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{NUM_PARTS, Pose};

    fn blank_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    fn point_pose(row: f32, col: f32) -> Pose {
        Pose::new([(row, col); NUM_PARTS])
    }

    #[test]
    fn test_nothing_to_draw_leaves_frame_identical() {
        let mut frame = blank_frame(64, 64);
        let original = frame.clone();
        draw_overlays(&mut frame, 1.0, &[], &[]);
        assert_eq!(frame.as_raw(), original.as_raw());
    }

    #[test]
    fn test_center_circle_lands_at_swapped_coordinates() {
        let mut frame = blank_frame(200, 200);
        draw_overlays(&mut frame, 1.0, &[PersonCenter::new(100.0, 100.0)], &[]);
        assert_eq!(frame.get_pixel(100, 100).0, [255, 255, 0]);

        // An asymmetric center pins the (col, row) draw order: the pixel at
        // (x=col, y=row) is painted, the transposed one is not.
        let mut frame = blank_frame(200, 200);
        draw_overlays(&mut frame, 1.0, &[PersonCenter::new(30.0, 70.0)], &[]);
        assert_eq!(frame.get_pixel(70, 30).0, [255, 255, 0]);
        assert_eq!(frame.get_pixel(30, 70).0, [0, 0, 0]);
    }

    #[test]
    fn test_center_scale_applies_to_both_axes() {
        let mut frame = blank_frame(128, 128);
        draw_overlays(&mut frame, 0.5, &[PersonCenter::new(100.0, 60.0)], &[]);
        assert_eq!(frame.get_pixel(30, 50).0, [255, 255, 0]);
    }

    #[test]
    fn test_zero_length_limb_degenerates_without_panicking() {
        let mut frame = blank_frame(64, 64);
        draw_overlays(&mut frame, 1.0, &[], &[point_pose(32.0, 32.0)]);
        // The degenerate ovals still cover a point-like neighborhood.
        let changed = frame.pixels().any(|p| p.0 != [0, 0, 0]);
        assert!(changed);
    }

    #[test]
    fn test_limb_blend_is_translucent() {
        // One pose whose head-neck limb is a long horizontal segment; the
        // midpoint gets 60% of the limb color over a black frame.
        let mut joints = [(60.0f32, 60.0f32); NUM_PARTS];
        joints[0] = (32.0, 8.0); // head
        joints[1] = (32.0, 56.0); // neck
        let mut frame = blank_frame(64, 64);
        draw_overlays(&mut frame, 1.0, &[], &[Pose::new(joints)]);
        // Head-neck limb color is red; 255 * 0.6 = 153.
        assert_eq!(frame.get_pixel(32, 32).0, [153, 0, 0]);
    }

    #[test]
    fn test_sentinel_joints_are_skipped() {
        let mut joints = [(f32::NAN, f32::NAN); NUM_PARTS];
        joints[2] = (10.0, 10.0);
        let mut frame = blank_frame(64, 64);
        let original = frame.clone();
        draw_overlays(&mut frame, 1.0, &[], &[Pose::new(joints)]);
        // Only the one finite joint dot is drawn (black on black), and no
        // limb touches it, so the frame stays unchanged.
        assert_eq!(frame.as_raw(), original.as_raw());
    }

    #[test]
    fn test_off_frame_pose_does_not_panic() {
        let mut frame = blank_frame(32, 32);
        draw_overlays(&mut frame, 1.0, &[], &[point_pose(-500.0, 900.0)]);
    }

    #[test]
    fn test_oval_polygon_is_open_and_deduplicated() {
        let polygon = oval_polygon((20.0, 20.0), 10.0, 6.0, 0.7);
        assert!(polygon.len() >= 3);
        assert_ne!(polygon.first(), polygon.last());
        for pair in polygon.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }
}
