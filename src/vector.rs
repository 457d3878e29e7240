//! Three-axis codecs built from one [`BoundedValueCodec`] per axis.

use nalgebra::Vector3;

use crate::codec::{
    BASE, BoundedValueCodec, Codec, MID_DIGIT, RoundTo, digits_from_str, from_char, to_char,
};
use crate::error::{PoseError, Result};
use crate::euler::Axis;

/// Digit-level bone rotation, one digit per axis in X, Y, Z order.
pub type DiscreteVector = [u32; 3];

/// Digit-level position, one `[high, low]` pair per axis.
pub type DoubleDiscreteVector = [[u32; 2]; 3];

pub const NEUTRAL_VECTOR: DiscreteVector = [MID_DIGIT; 3];

pub const NEUTRAL_DOUBLE_VECTOR: DoubleDiscreteVector = [[MID_DIGIT, 0]; 3];

// ─── Masked single precision ──────────────────────────────────────────────────

/// Single precision vector codec where each axis is either serialized with
/// its own bounds or disabled.
///
/// Disabled axes write nothing and always read back as [`MID_DIGIT`], which
/// stands for an angle of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorCodec {
    axes: [Option<BoundedValueCodec>; 3],
    active: usize,
}

impl VectorCodec {
    pub fn new(axes: [Option<BoundedValueCodec>; 3]) -> Self {
        let active = axes.iter().filter(|axis| axis.is_some()).count();
        Self { axes, active }
    }

    /// All three axes active, with per-axis bounds.
    pub fn full(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self::new([
            Some(BoundedValueCodec::new(min.x, max.x)),
            Some(BoundedValueCodec::new(min.y, max.y)),
            Some(BoundedValueCodec::new(min.z, max.z)),
        ])
    }

    pub fn axis(&self, axis: Axis) -> Option<&BoundedValueCodec> {
        self.axes[axis.index()].as_ref()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }
}

impl Codec for VectorCodec {
    type Value = Vector3<f32>;
    type Discrete = DiscreteVector;

    fn width(&self) -> usize {
        self.active
    }

    fn discretize(&self, value: Vector3<f32>, round_to: RoundTo) -> DiscreteVector {
        let mut digits = NEUTRAL_VECTOR;
        for (index, codec) in self.axes.iter().enumerate() {
            if let Some(codec) = codec {
                digits[index] = codec.discretize(value[index], round_to);
            }
        }
        digits
    }

    fn make_continuous(&self, discrete: &DiscreteVector) -> Vector3<f32> {
        let mut value = Vector3::zeros();
        for (index, codec) in self.axes.iter().enumerate() {
            if let Some(codec) = codec {
                value[index] = codec.make_continuous(discrete[index]);
            }
        }
        value
    }

    fn write_discrete(&self, discrete: &DiscreteVector, out: &mut String) -> Result<()> {
        for (index, codec) in self.axes.iter().enumerate() {
            if codec.is_some() {
                out.push(to_char(discrete[index])?);
            }
        }
        Ok(())
    }

    fn read_discrete(&self, chars: &str) -> Result<DiscreteVector> {
        let mut input = chars.chars();
        let mut digits = NEUTRAL_VECTOR;
        for (index, codec) in self.axes.iter().enumerate() {
            if codec.is_none() {
                continue;
            }
            let character = input.next().ok_or_else(|| width_error(chars, self.active))?;
            digits[index] = from_char(character)?;
        }

        if input.next().is_some() {
            return Err(width_error(chars, self.active));
        }

        Ok(digits)
    }
}

fn width_error(chars: &str, expected: usize) -> PoseError {
    PoseError::serialization(format!(
        "field \"{chars}\" should be {expected} characters long"
    ))
}

// ─── Double precision ─────────────────────────────────────────────────────────

/// Double precision vector codec with all three axes active, written as
/// `xh xl yh yl zh zl`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleVectorCodec {
    axes: [BoundedValueCodec; 3],
}

impl DoubleVectorCodec {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self {
            axes: [
                BoundedValueCodec::new(min.x, max.x),
                BoundedValueCodec::new(min.y, max.y),
                BoundedValueCodec::new(min.z, max.z),
            ],
        }
    }

    /// Codec for the cube `[-bound, bound]³`.
    pub fn cube(bound: f32) -> Self {
        Self::new(Vector3::repeat(-bound), Vector3::repeat(bound))
    }

    /// Smallest representable difference on `axis`.
    pub fn resolution(&self, axis: Axis) -> f32 {
        self.axes[axis.index()].step() / BASE as f32
    }

    /// Clamps every component to the codec bounds without quantizing.
    pub fn clamp(&self, value: Vector3<f32>) -> Vector3<f32> {
        Vector3::from_fn(|index, _| {
            let codec = &self.axes[index];
            value[index].max(codec.min()).min(codec.max())
        })
    }
}

impl Codec for DoubleVectorCodec {
    type Value = Vector3<f32>;
    type Discrete = DoubleDiscreteVector;

    fn width(&self) -> usize {
        6
    }

    fn discretize(&self, value: Vector3<f32>, round_to: RoundTo) -> DoubleDiscreteVector {
        [
            self.axes[0].discretize_double(value.x, round_to),
            self.axes[1].discretize_double(value.y, round_to),
            self.axes[2].discretize_double(value.z, round_to),
        ]
    }

    fn make_continuous(&self, discrete: &DoubleDiscreteVector) -> Vector3<f32> {
        Vector3::new(
            self.axes[0].make_continuous_double(discrete[0]),
            self.axes[1].make_continuous_double(discrete[1]),
            self.axes[2].make_continuous_double(discrete[2]),
        )
    }

    fn write_discrete(&self, discrete: &DoubleDiscreteVector, out: &mut String) -> Result<()> {
        for [high, low] in discrete {
            out.push(to_char(*high)?);
            out.push(to_char(*low)?);
        }
        Ok(())
    }

    fn read_discrete(&self, chars: &str) -> Result<DoubleDiscreteVector> {
        let [xh, xl, yh, yl, zh, zl] = digits_from_str::<6>(chars)?;
        Ok([[xh, xl], [yh, yl], [zh, zl]])
    }
}
