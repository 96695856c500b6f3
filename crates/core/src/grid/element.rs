//! Grid element trait for generic cell values

use num_traits::{NumCast, ToPrimitive, Zero};
use std::fmt::{Debug, Display};

/// Trait for types that can be stored in a grid cell.
///
/// Elevations, basin labels and intermediate rasters all go through
/// [`Grid`](super::Grid), so the bound stays numeric and copyable.
pub trait GridElement:
    Copy + Debug + Display + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Convert self to f64
    fn as_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }

    /// Convert any numeric value into this type, saturating at the type's
    /// range and rounding reals to the nearest integer for integer types.
    /// NaN maps to zero.
    fn saturating_from<V: ToPrimitive>(value: V) -> Self;
}

macro_rules! impl_grid_element_int {
    ($t:ty) => {
        impl GridElement for $t {
            fn saturating_from<V: ToPrimitive>(value: V) -> Self {
                let v = match value.to_f64() {
                    Some(v) if !v.is_nan() => v.round(),
                    _ => return 0,
                };
                if v <= <$t>::MIN as f64 {
                    <$t>::MIN
                } else if v >= <$t>::MAX as f64 {
                    <$t>::MAX
                } else {
                    v as $t
                }
            }
        }
    };
}

macro_rules! impl_grid_element_float {
    ($t:ty) => {
        impl GridElement for $t {
            fn saturating_from<V: ToPrimitive>(value: V) -> Self {
                match value.to_f64() {
                    Some(v) if !v.is_nan() => v.clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t,
                    _ => 0.0,
                }
            }
        }
    };
}

impl_grid_element_int!(i8);
impl_grid_element_int!(i16);
impl_grid_element_int!(i32);
impl_grid_element_int!(i64);
impl_grid_element_int!(u8);
impl_grid_element_int!(u16);
impl_grid_element_int!(u32);
impl_grid_element_int!(u64);
impl_grid_element_float!(f32);
impl_grid_element_float!(f64);
