//! Diffusion gradient normalization.
//!
//! A single b-value is declared for the whole series (the largest one), and each gradient
//! vector is rescaled so its magnitude carries its strength relative to that b-value.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{NhdrError, Result, Vec3};

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use super::*;

    fn norm(v: &Vec3) -> f64 {
        v.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn reference_is_max() {
        assert_eq!(reference_strength(&[0., 1000., 3000., 2000.]).unwrap(), 3000.);
        assert_eq!(reference_strength(&[5.]).unwrap(), 5.);
    }

    #[test]
    fn reference_errors() {
        assert!(matches!(reference_strength(&[]), Err(NhdrError::InputShape(_))));
        assert!(matches!(reference_strength(&[0., 0., 0.]), Err(NhdrError::DegenerateStrengths { count: 3 })));
        assert!(matches!(
            reference_strength(&[0., 1000., -5.]),
            Err(NhdrError::NegativeStrength { index: 2, .. })
        ));
        assert!(matches!(
            reference_strength(&[f64::NAN, 1000.]),
            Err(NhdrError::NegativeStrength { index: 0, .. })
        ));
    }

    #[test]
    fn zero_strength_passthrough() {
        for v in [[0., 0., 0.], [1., 0., 0.], [0.3, -0.4, 12.0]] {
            assert_eq!(scale_vector(0., &v, 1000.), v);
        }
    }

    #[test]
    fn reference_strength_scales_by_one() {
        let v = [0.577, 0.577, 0.577];
        let s = scale_vector(1000., &v, 1000.);
        for (a, b) in s.iter().zip(v.iter()) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    fn lower_strength_grows_vector() {
        // b = 250 against a reference of 1000 -> sqrt(4) = 2
        let s = scale_vector(250., &[0., 1., 0.], 1000.);
        assert_relative_eq!(s[1], 2.0);
        assert_relative_eq!(norm(&s), 2.0);
    }

    #[test]
    fn norm_matching_factor_is_left_alone() {
        let v = [2.0, 0.0, 0.0];
        assert_eq!(scale_vector(250., &v, 1000.), v);
    }

    #[test]
    fn gradient_set_checks_lengths() {
        let r = GradientSet::new(vec![[1., 0., 0.]; 3], vec![1000.; 2]);
        assert!(matches!(r, Err(NhdrError::InputShape(_))));
        let r = GradientSet::new(vec![], vec![]);
        assert!(matches!(r, Err(NhdrError::InputShape(_))));
    }

    #[test]
    fn scaled_keeps_input_order() {
        let table: Vec<Vec3> = (0..200).map(|i| [i as f64, 0., 0.]).collect();
        let strengths = vec![1000.; 200];
        let set = GradientSet::new(table.clone(), strengths).unwrap();
        let scaled = set.scaled();
        assert_eq!(scaled.len(), 200);
        for (i, (s, t)) in scaled.iter().zip(table.iter()).enumerate() {
            assert_relative_eq!(s[0], t[0]);
            assert_eq!(s[0] as usize, i);
        }
    }

    #[test]
    fn deserialize_goes_through_checks() {
        // counts differ and the stored reference strength is bogus
        let r = serde_json::from_str::<GradientSet>(
            r#"{"directions":[[1,0,0],[0,1,0]],"strengths":[1000],"reference_strength":0.0}"#
        );
        assert!(r.is_err());
        let r = serde_json::from_str::<GradientSet>(r#"{"directions":[[1,0,0]],"strengths":[0]}"#);
        assert!(r.is_err());

        let set: GradientSet = serde_json::from_str(
            r#"{"directions":[[0,0,0],[0,1,0]],"strengths":[0,1000],"reference_strength":0.0}"#
        ).unwrap();
        assert_eq!(set.reference_strength(), 1000.);
        assert_eq!(set.scaled().len(), 2);
    }

    #[test]
    fn serde_round_trip() {
        let set = GradientSet::new(vec![[0., 0., 0.], [0.577, 0.577, 0.577]], vec![0., 3000.]).unwrap();
        let back: GradientSet = serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn gradient_labels() {
        assert_eq!(gradient_key(0), "DWMRI_gradient_0000");
        assert_eq!(gradient_key(42), "DWMRI_gradient_0042");
        assert_eq!(gradient_key(12345), "DWMRI_gradient_12345");
    }

}

/// The largest strength in the series. Strengths must be finite and non-negative, and at
/// least one must be non-zero to normalize against
pub fn reference_strength(strengths: &[f64]) -> Result<f64> {
    if strengths.is_empty() {
        Err(NhdrError::shape("no gradient strengths given"))?
    }
    let mut max = 0.;
    for (index, &value) in strengths.iter().enumerate() {
        if !(value >= 0.) || value.is_infinite() {
            Err(NhdrError::NegativeStrength { index, value })?
        }
        if value > max {
            max = value;
        }
    }
    if max == 0. {
        Err(NhdrError::DegenerateStrengths { count: strengths.len() })?
    }
    Ok(max)
}

/// Scale a gradient direction by sqrt(reference / strength). Zero strength marks a
/// non-diffusion weighted volume and its vector is returned as is
pub fn scale_vector(strength: f64, vector: &Vec3, reference_strength: f64) -> Vec3 {
    if strength == 0. {
        return *vector;
    }
    let factor = (reference_strength / strength).sqrt();
    let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == factor {
        return *vector;
    }
    vector.map(|x| x * factor)
}

/// key of the gradient at `index`, zero padded to 4 digits
pub fn gradient_key(index: usize) -> String {
    format!("DWMRI_gradient_{:04}", index)
}

/// Gradient directions and their strengths, one entry per diffusion volume in acquisition order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGradientSet")]
pub struct GradientSet {
    directions: Vec<Vec3>,
    strengths: Vec<f64>,
    reference_strength: f64,
}

/// serialized form. The reference strength is always recomputed by `GradientSet::new`
#[derive(Deserialize)]
struct RawGradientSet {
    directions: Vec<Vec3>,
    strengths: Vec<f64>,
}

impl TryFrom<RawGradientSet> for GradientSet {
    type Error = NhdrError;
    fn try_from(raw: RawGradientSet) -> Result<GradientSet> {
        GradientSet::new(raw.directions, raw.strengths)
    }
}

impl GradientSet {

    pub fn new(directions: Vec<Vec3>, strengths: Vec<f64>) -> Result<GradientSet> {
        if directions.len() != strengths.len() {
            Err(NhdrError::shape(format!(
                "{} gradient directions but {} gradient strengths",
                directions.len(), strengths.len()
            )))?
        }
        let reference_strength = reference_strength(&strengths)?;
        debug!(n_gradients = directions.len(), reference_strength, "gradient table loaded");
        Ok(GradientSet {
            directions,
            strengths,
            reference_strength,
        })
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn reference_strength(&self) -> f64 {
        self.reference_strength
    }

    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }

    /// normalized gradient vectors in acquisition order
    pub fn scaled(&self) -> Vec<Vec3> {
        let b_ref = self.reference_strength;
        self.directions.par_iter()
            .zip(self.strengths.par_iter())
            .map(|(v, &b)| scale_vector(b, v, b_ref))
            .collect()
    }

}
