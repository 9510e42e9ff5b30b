//! Fixed 3x3 kernel table.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Smooth,
    Blur,
    Sharpen,
    Mean,
    Emboss,
}

/// A 3x3 matrix of `f32` weights, indexed `[ky][kx]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel {
    weights: [[f32; 3]; 3],
}

// Each weight is one `f32` division, tap / divisor.
const SMOOTH: Kernel = Kernel {
    weights: [[1.0 / 9.0; 3]; 3],
};

const BLUR: Kernel = Kernel {
    weights: [
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
        [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    ],
};

const SHARPEN: Kernel = Kernel {
    weights: [
        [0.0, -2.0 / 3.0, 0.0],
        [-2.0 / 3.0, 11.0 / 3.0, -2.0 / 3.0],
        [0.0, -2.0 / 3.0, 0.0],
    ],
};

const MEAN: Kernel = Kernel {
    weights: [[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]],
};

const EMBOSS: Kernel = Kernel {
    weights: [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
};

impl Filter {
    pub fn kernel(self) -> &'static Kernel {
        match self {
            Filter::Smooth => &SMOOTH,
            Filter::Blur => &BLUR,
            Filter::Sharpen => &SHARPEN,
            Filter::Mean => &MEAN,
            Filter::Emboss => &EMBOSS,
        }
    }
}

impl Kernel {
    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }

    /// Weighted sum of a 3x3 neighbourhood.
    ///
    /// Products are accumulated in `f32` in row-major order, so a uniform
    /// field is not always a fixed point of an averaging kernel (smooth on
    /// 3 gives 2). The sum is truncated toward zero and wrapped into a
    /// byte; no clamping.
    #[inline]
    pub fn apply(&self, neighbourhood: [[u8; 3]; 3]) -> u8 {
        let mut sum = 0.0f32;
        for (weights, samples) in self.weights.iter().zip(neighbourhood.iter()) {
            for (&weight, &sample) in weights.iter().zip(samples.iter()) {
                sum += sample as f32 * weight;
            }
        }

        sum as i32 as u8
    }
}
