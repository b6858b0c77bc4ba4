//! Intensity-accumulator domain: clamped weighted sum.

use super::Resolve;
use crate::store::Contributions;

/// Upper clamp for the accumulated intensity baseline.
pub const INTENSITY_MAX: f32 = 100.0;

/// Sums every contribution's weight, clamped to `0.0..=INTENSITY_MAX`.
/// The result is the *baseline* the displayed level decays toward; the
/// decay arithmetic lives in the intensity handler, keeping resolution a
/// pure function of the entry set.
#[derive(Debug, Default)]
pub struct IntensityResolver;

impl Resolve for IntensityResolver {
    type Payload = f32;
    type Final = f32;

    fn neutral(&self) -> Self::Final {
        0.0
    }

    fn resolve(&self, entries: &Contributions<Self::Payload>) -> Self::Final {
        let sum: f32 = entries.iter().map(|(_, w)| *w).sum();
        sum.clamp(0.0, INTENSITY_MAX)
    }
}
