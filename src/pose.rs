// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose assembly: body parts, the limb table, and heat-map-to-skeleton
//! conversion.

use ndarray::{ArrayView3, Axis};

use crate::heatmap;
use crate::warn;

/// Number of localized body parts per pose.
pub const NUM_PARTS: usize = 14;

/// Side length of the processing frame the heat maps were computed at.
pub const INPUT_SIZE: f32 = 368.0;

const HALF_INPUT: f32 = INPUT_SIZE / 2.0;

/// Sentinel joint coordinate for heat maps that could not be decoded.
pub const SENTINEL: (f32, f32) = (f32::NAN, f32::NAN);

/// Body parts in heat-map channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Head,
    Neck,
    RightShoulder,
    RightElbow,
    RightWrist,
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftHip,
    LeftKnee,
    LeftAnkle,
}

impl BodyPart {
    /// All parts, in heat-map channel order.
    pub const ALL: [Self; NUM_PARTS] = [
        Self::Head,
        Self::Neck,
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
    ];

    /// Short part name used in log messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::RightShoulder => "Rsho",
            Self::RightElbow => "Relb",
            Self::RightWrist => "Rwri",
            Self::LeftShoulder => "Lsho",
            Self::LeftElbow => "Lelb",
            Self::LeftWrist => "Lwri",
            Self::RightHip => "Rhip",
            Self::RightKnee => "Rkne",
            Self::RightAnkle => "Rank",
            Self::LeftHip => "Lhip",
            Self::LeftKnee => "Lkne",
            Self::LeftAnkle => "Lank",
        }
    }
}

/// Approximate person location, (row, col) in the 368x368 input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonCenter {
    /// Row coordinate.
    pub row: f32,
    /// Column coordinate.
    pub col: f32,
}

impl PersonCenter {
    /// Create a center from a (row, col) pair.
    #[must_use]
    pub const fn new(row: f32, col: f32) -> Self {
        Self { row, col }
    }
}

impl From<(f32, f32)> for PersonCenter {
    fn from((row, col): (f32, f32)) -> Self {
        Self { row, col }
    }
}

/// One detected person's skeleton: 14 joint coordinates, (row, col), in the
/// same frame as the originating center. Immutable once assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    joints: [(f32, f32); NUM_PARTS],
}

impl Pose {
    /// Build a pose directly from joint coordinates.
    #[must_use]
    pub const fn new(joints: [(f32, f32); NUM_PARTS]) -> Self {
        Self { joints }
    }

    /// Coordinate of one joint.
    #[must_use]
    pub const fn joint(&self, part: BodyPart) -> (f32, f32) {
        self.joints[part as usize]
    }

    /// All joint coordinates, in body-part order.
    #[must_use]
    pub const fn joints(&self) -> &[(f32, f32); NUM_PARTS] {
        &self.joints
    }
}

/// A drawn limb segment: two joint endpoints and a fill color (RGB).
#[derive(Debug, Clone, Copy)]
pub struct Limb {
    /// First endpoint.
    pub from: BodyPart,
    /// Second endpoint.
    pub to: BodyPart,
    /// Fill color for the limb overlay.
    pub color: [u8; 3],
}

const fn limb(from: BodyPart, to: BodyPart, color: [u8; 3]) -> Limb {
    Limb { from, to, color }
}

/// The 9 drawn limb segments with their fixed colors. Static configuration.
pub const LIMBS: [Limb; 9] = [
    limb(BodyPart::Head, BodyPart::Neck, [255, 0, 0]),
    limb(BodyPart::RightShoulder, BodyPart::RightElbow, [255, 170, 0]),
    limb(BodyPart::RightElbow, BodyPart::RightWrist, [170, 255, 0]),
    limb(BodyPart::LeftShoulder, BodyPart::LeftElbow, [0, 255, 0]),
    limb(BodyPart::LeftElbow, BodyPart::LeftWrist, [0, 255, 170]),
    limb(BodyPart::RightHip, BodyPart::RightKnee, [0, 170, 255]),
    limb(BodyPart::RightKnee, BodyPart::RightAnkle, [0, 0, 255]),
    limb(BodyPart::LeftHip, BodyPart::LeftKnee, [170, 0, 255]),
    limb(BodyPart::LeftKnee, BodyPart::LeftAnkle, [255, 0, 170]),
];

/// Shift a decoded upsampled-grid coordinate into the center's frame.
#[must_use]
pub fn recenter(node: (f32, f32), center: PersonCenter) -> (f32, f32) {
    (
        node.0 - HALF_INPUT + center.row,
        node.1 - HALF_INPUT + center.col,
    )
}

/// Assemble one pose from a person center and a stack of per-joint heat
/// maps (channel-major, at least [`NUM_PARTS`] channels; the trailing
/// background channel of a 15-channel stack is ignored).
///
/// All 14 joints are processed even when some maps are degenerate. A map
/// containing non-finite values is reported and its joint set to
/// [`SENTINEL`]; the remaining joints still decode.
///
/// # Panics
///
/// Panics if `maps` has fewer than [`NUM_PARTS`] channels.
#[must_use]
pub fn assemble(center: PersonCenter, maps: ArrayView3<'_, f32>) -> Pose {
    assert!(
        maps.len_of(Axis(0)) >= NUM_PARTS,
        "expected at least {NUM_PARTS} heat-map channels, got {}",
        maps.len_of(Axis(0))
    );
    let mut joints = [(0.0f32, 0.0f32); NUM_PARTS];
    for (index, part) in BodyPart::ALL.iter().enumerate() {
        let map = maps.index_axis(Axis(0), index);
        if map.iter().any(|v| !v.is_finite()) {
            warn!("non-finite heat map for {}, joint set to sentinel", part.name());
            joints[index] = SENTINEL;
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let node = {
            let (row, col) = heatmap::decode(map);
            (row as f32, col as f32)
        };
        joints[index] = recenter(node, center);
    }
    Pose::new(joints)
}
