//! Numeric to text conversion for nrrd header fields.
//!
//! The nhdr consumers are byte sensitive: matrices are written as `(a,b,c) (d,e,f)`
//! and gradient vectors as three-space separated decimals. Floats are written with
//! the shortest decimal that reads back to the exact same value (at most 17
//! significant digits), never in exponent notation, and always with a decimal point.
use std::fmt::Display;
use num_traits::Float;
use crate::Vec3;

/// separator between gradient vector components
pub const VECTOR_SEPARATOR: &str = "   ";


/// A number that can appear inside an nrrd header field
pub trait NrrdNumber {
    fn to_nrrd_string(&self) -> String;
}

macro_rules! impl_nrrd_int {
    ($($t:ty),*) => {
        $(
            impl NrrdNumber for $t {
                fn to_nrrd_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_nrrd_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl NrrdNumber for f64 {
    fn to_nrrd_string(&self) -> String {
        format_float(*self)
    }
}

impl NrrdNumber for f32 {
    fn to_nrrd_string(&self) -> String {
        format_float(*self)
    }
}

/// full precision decimal text for a float. Display for floats is already the shortest
/// round-trip representation without exponents, it only drops the trailing `.0` of integral values
pub fn format_float<T>(x: T) -> String
where T: Float + Display
{
    let mut s = x.to_string();
    if x.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// render a matrix as `(a,b,c) (d,e,f) (g,h,i)`, one parenthesized group per row
pub fn format_matrix<T, const R: usize, const C: usize>(matrix: &[[T; C]; R]) -> String
where T: NrrdNumber
{
    matrix.iter()
        .map(|row| format_vector(row))
        .collect::<Vec<_>>()
        .join(" ")
}

/// render a vector as `(x,y,z)`
pub fn format_vector<T, const N: usize>(vector: &[T; N]) -> String
where T: NrrdNumber
{
    let entries: Vec<String> = vector.iter().map(|x| x.to_nrrd_string()).collect();
    format!("({})", entries.join(","))
}

/// render a gradient vector with its components separated by three spaces
pub fn render_vector(vector: &Vec3) -> String {
    vector.iter()
        .map(|&x| format_float(x))
        .collect::<Vec<_>>()
        .join(VECTOR_SEPARATOR)
}
