use std::path::{Path, PathBuf};
use nifti::NiftiHeader;
use tracing::{debug, warn};
use crate::io_bvec::with_suffix;
use crate::{Encoding, Mat4, NhdrError, Result, VolumeMetadata};


/// find the volume belonging to `prefix`, either prefix.nii.gz (gzip) or prefix.nii (raw)
pub fn locate_volume(prefix: impl AsRef<Path>) -> Result<(PathBuf, Encoding)> {
    let prefix = prefix.as_ref();
    let candidates = [("nii.gz", Encoding::Gzip), ("nii", Encoding::Raw)];
    for (ext, encoding) in candidates {
        let file = with_suffix(prefix, ext);
        if file.exists() {
            debug!("found volume {}", file.display());
            return Ok((file, encoding));
        }
    }
    Err(NhdrError::VolumeNotFound(prefix.to_owned()))
}

/// read the header of a nifti file into volume metadata. The data file entry is the file
/// name only, since the nhdr is written next to the volume
pub fn read_volume_metadata(file: impl AsRef<Path>, encoding: Encoding) -> Result<VolumeMetadata> {
    let file = file.as_ref();
    let header = NiftiHeader::from_file(file)?;
    let data_file = file.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string_lossy().into_owned());
    volume_metadata_from_header(&header, encoding, data_file)
}

pub fn volume_metadata_from_header(header: &NiftiHeader, encoding: Encoding, data_file: impl Into<String>) -> Result<VolumeMetadata> {
    let ndims = header.dim[0] as usize;
    if !(1..=7).contains(&ndims) {
        Err(NhdrError::shape(format!("nifti header reports {ndims} dimensions")))?
    }
    let sizes: Vec<usize> = header.dim[1..=ndims].iter().map(|&d| d as usize).collect();
    let spacing: Vec<f64> = header.pixdim[1..=ndims].iter().map(|&p| p as f64).collect();
    if header.sform_code == 0 {
        warn!("sform_code is 0, using the stored sform rows anyway");
    }
    VolumeMetadata::new(&sizes, sform(header), &spacing, encoding, data_file)
}

fn sform(header: &NiftiHeader) -> Mat4 {
    let row = |r: &[f32; 4]| r.map(|x| x as f64);
    [
        row(&header.srow_x),
        row(&header.srow_y),
        row(&header.srow_z),
        [0., 0., 0., 1.],
    ]
}
