//! Spatial and structural nrrd fields derived from the volume metadata.
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{Dimension, Mat3, Mat4, NhdrError, Result, Vec3, VolumeMetadata};


/// Spatial fields of the nrrd header
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialFields {
    pub space_directions: Mat3,
    pub space_origin: Vec3,
    /// only present for 4D (diffusion) volumes
    pub measurement_frame: Option<Mat3>,
}

impl SpatialFields {

    pub fn derive(volume: &VolumeMetadata) -> Result<SpatialFields> {
        let space_directions = direction_matrix(volume.affine());
        let space_origin = origin(volume.affine());
        let measurement_frame = match volume.dimension() {
            Dimension::Four => Some(measurement_frame(&space_directions, volume.spacing())?),
            Dimension::Three => None,
        };
        debug!(?space_directions, ?space_origin, ?measurement_frame, "derived spatial fields");
        Ok(SpatialFields {
            space_directions,
            space_origin,
            measurement_frame,
        })
    }

}

/// the transpose of the rotation/scale block of the affine. Columns of the affine are the
/// physical steps along each voxel axis, nrrd lists them one per group
pub fn direction_matrix(affine: &Mat4) -> Mat3 {
    let mut d = [[0.; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            d[i][j] = affine[j][i];
        }
    }
    d
}

/// translation column of the affine
pub fn origin(affine: &Mat4) -> Vec3 {
    [affine[0][3], affine[1][3], affine[2][3]]
}

/// inverse(diag(spacing)) * direction_matrix over the first three axes. Inverting a diagonal
/// matrix is a row-wise scaling, so zero spacing is rejected instead of producing inf/NaN.
/// Spacing is stored as float32 (nifti pixdim) and its reciprocal is taken at that precision
pub fn measurement_frame(direction_matrix: &Mat3, spacing: &[f64]) -> Result<Mat3> {
    if spacing.len() < 3 {
        Err(NhdrError::shape(format!(
            "measurement frame needs 3 spacing values, got {}", spacing.len()
        )))?
    }
    let mut mf = [[0.; 3]; 3];
    for (axis, (row, &s)) in mf.iter_mut().zip(&spacing[0..3]).enumerate() {
        let inv = (1.0f32 / s as f32) as f64;
        if s == 0. || !inv.is_finite() {
            Err(NhdrError::ZeroSpacing { axis, value: s })?
        }
        for (m, d) in row.iter_mut().zip(direction_matrix[axis].iter()) {
            *m = d * inv;
        }
    }
    Ok(mf)
}

pub fn centerings(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Three => "cell cell cell",
        Dimension::Four => "cell cell cell ???",
    }
}

pub fn kinds(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Three => "space space space",
        Dimension::Four => "space space space list",
    }
}
