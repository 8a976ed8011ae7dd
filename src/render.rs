use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use crate::format::{format_float, format_matrix, format_vector, render_vector};
use crate::gradients::{gradient_key, GradientSet};
use crate::header::{centerings, kinds, SpatialFields};
use crate::io_bvec::with_suffix;
use crate::{NhdrError, Result, VolumeMetadata};

pub const MAGIC: &str = "NRRD0005";

const PROVENANCE: [&str; 4] = [
    "# This nhdr file was generated by pnl.bwh.harvard.edu pipeline",
    "# See https://github.com/pnlbwh for more info",
    "# Complete NRRD file format specification at:",
    "# http://teem.sourceforge.net/nrrd/format.html",
];


/// A fully rendered nhdr, one entry per line in header order.
/// Only constructed once every field has been derived, so a failed conversion never produces one
#[derive(Clone, Debug, PartialEq)]
pub struct NhdrDocument {
    lines: Vec<String>,
}

impl NhdrDocument {

    /// derive and render every header field. Gradients are required for 4D volumes
    /// (one per volume) and optional for 3D volumes
    pub fn build(volume: &VolumeMetadata, gradients: Option<&GradientSet>) -> Result<NhdrDocument> {

        if let Some(n_volumes) = volume.n_volumes() {
            let n_gradients = gradients.map(|g| g.len()).unwrap_or(0);
            if n_gradients != n_volumes {
                Err(NhdrError::shape(format!(
                    "volume has {n_volumes} diffusion volumes but {n_gradients} gradients were given"
                )))?
            }
        }

        let spatial = SpatialFields::derive(volume)?;
        let dimension = volume.dimension();

        let mut lines = vec![MAGIC.to_string()];
        lines.extend(PROVENANCE.iter().map(|c| c.to_string()));
        lines.push(String::from("type: short"));
        lines.push(format!("dimension: {}", dimension.ndims()));
        lines.push(String::from("space: right-anterior-superior"));
        let sizes: Vec<String> = volume.sizes().iter().map(|s| s.to_string()).collect();
        lines.push(format!("sizes: {}", sizes.join(" ")));
        lines.push(format!("space directions: {}", format_matrix(&spatial.space_directions)));
        lines.push(String::from("byteskip: -1"));
        lines.push(String::from("endian: little"));
        lines.push(format!("encoding: {}", volume.encoding()));
        lines.push(String::from("space units: \"mm\" \"mm\" \"mm\""));
        lines.push(format!("space origin: {}", format_vector(&spatial.space_origin)));
        lines.push(format!("data file: {}", volume.data_file()));
        lines.push(format!("centerings: {}", centerings(dimension)));
        lines.push(format!("kinds: {}", kinds(dimension)));

        // derived for 4D volumes only
        if let Some(mf) = &spatial.measurement_frame {
            lines.push(format!("measurement frame: {}", format_matrix(mf)));
        }

        if let Some(gradients) = gradients {
            lines.push(String::from("modality:=DWMRI"));
            lines.push(format!("DWMRI_b-value:={}", format_float(gradients.reference_strength())));
            for (index, v) in gradients.scaled().iter().enumerate() {
                lines.push(format!("{}:={}", gradient_key(index), render_vector(v)));
            }
        }

        debug!(n_lines = lines.len(), "rendered nhdr");
        Ok(NhdrDocument { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// write all lines to a sink, each terminated by a newline
    pub fn write_to<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(sink, "{}", line)?;
        }
        Ok(())
    }

}

impl fmt::Display for NhdrDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Write the header to `file`. The text goes to a sibling temp file first and is renamed
/// into place, so an interrupted write never leaves a partial header at `file`
pub fn write_nhdr(file: impl AsRef<Path>, doc: &NhdrDocument) -> Result<()> {
    let file = file.as_ref();
    let tmp = file.with_extension("nhdr.tmp");
    let result = (|| -> std::io::Result<()> {
        let mut w = BufWriter::new(File::create(&tmp)?);
        doc.write_to(&mut w)?;
        w.into_inner().map_err(|e| e.into_error())?.sync_all()
    })();
    if let Err(e) = result.and_then(|_| fs::rename(&tmp, file)) {
        let _ = fs::remove_file(&tmp);
        return Err(NhdrError::from(e));
    }
    info!("wrote {}", file.display());
    Ok(())
}

/// where the header for `prefix` goes: `output` if given, otherwise prefix.nhdr
pub fn nhdr_path(prefix: impl AsRef<Path>, output: Option<&Path>) -> PathBuf {
    match output {
        Some(o) => o.to_owned(),
        None => with_suffix(prefix.as_ref(), "nhdr"),
    }
}
