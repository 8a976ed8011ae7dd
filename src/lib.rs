/*
    Minimal library for writing detached NRRD headers (.nhdr) for diffusion weighted volumes.
    Every shape in this domain is fixed (3-vectors, 3x3 and 4x4 matrices) so they are plain arrays
    Volume metadata is read by a collaborator (io_nifti) and turned into an ordered set of header lines
 */
use std::fmt;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod format;
pub mod gradients;
pub mod header;
pub mod io_bvec;
pub mod render;

#[cfg(feature = "io-nifti")]
pub mod io_nifti;

pub use error::{NhdrError, Result};
pub use gradients::GradientSet;
pub use render::NhdrDocument;

pub type Vec3 = [f64; 3];
/// row-major 3x3 matrix
pub type Mat3 = [[f64; 3]; 3];
/// row-major 4x4 matrix (voxel index to physical space)
pub type Mat4 = [[f64; 4]; 4];

pub const IDENTITY4: Mat4 = [
    [1., 0., 0., 0.],
    [0., 1., 0., 0.],
    [0., 0., 1., 0.],
    [0., 0., 0., 1.],
];


/// number of axes of the volume. Only 3D images and 4D diffusion series are supported
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Three,
    Four,
}

impl Dimension {

    pub fn from_ndims(n: usize) -> Result<Dimension> {
        match n {
            3 => Ok(Dimension::Three),
            4 => Ok(Dimension::Four),
            _ => Err(NhdrError::shape(format!("dimension must be 3 or 4, got {n}"))),
        }
    }

    pub fn ndims(&self) -> usize {
        match self {
            Dimension::Three => 3,
            Dimension::Four => 4,
        }
    }

}

/// how the data file referenced by the header is stored on disk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    Gzip,
    Raw,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Raw => "raw",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header fields of the source volume, as handed over by the volume reader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVolumeMetadata")]
pub struct VolumeMetadata {
    dimension: Dimension,
    sizes: Vec<usize>,
    affine: Mat4,
    spacing: Vec<f64>,
    encoding: Encoding,
    data_file: String,
}

/// unchecked serialized form, only turned into `VolumeMetadata` through `VolumeMetadata::new`
#[derive(Deserialize)]
struct RawVolumeMetadata {
    dimension: Dimension,
    sizes: Vec<usize>,
    affine: Mat4,
    spacing: Vec<f64>,
    encoding: Encoding,
    data_file: String,
}

impl TryFrom<RawVolumeMetadata> for VolumeMetadata {
    type Error = NhdrError;
    fn try_from(raw: RawVolumeMetadata) -> Result<VolumeMetadata> {
        let vol = VolumeMetadata::new(&raw.sizes, raw.affine, &raw.spacing, raw.encoding, raw.data_file)?;
        if vol.dimension != raw.dimension {
            Err(NhdrError::shape(format!(
                "dimension {:?} does not match {} sizes", raw.dimension, raw.sizes.len()
            )))?
        }
        Ok(vol)
    }
}

impl VolumeMetadata {

    /// build checked volume metadata. The number of sizes determines the dimension.
    /// Spacing is checked for length only, zero spacing is reported where it is inverted
    pub fn new(sizes: &[usize], affine: Mat4, spacing: &[f64], encoding: Encoding, data_file: impl Into<String>) -> Result<VolumeMetadata> {
        let dimension = Dimension::from_ndims(sizes.len())?;
        if let Some(axis) = sizes.iter().position(|&s| s == 0) {
            Err(NhdrError::shape(format!("size of axis {axis} is zero")))?
        }
        if spacing.len() != sizes.len() {
            Err(NhdrError::shape(format!(
                "got {} spacing values for {} axes", spacing.len(), sizes.len()
            )))?
        }
        Ok(VolumeMetadata {
            dimension,
            sizes: sizes.to_vec(),
            affine,
            spacing: spacing.to_vec(),
            encoding,
            data_file: data_file.into(),
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn affine(&self) -> &Mat4 {
        &self.affine
    }

    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn data_file(&self) -> &str {
        &self.data_file
    }

    /// number of diffusion volumes (size of the 4th axis) for 4D data
    pub fn n_volumes(&self) -> Option<usize> {
        match self.dimension {
            Dimension::Four => Some(self.sizes[3]),
            Dimension::Three => None,
        }
    }

}
