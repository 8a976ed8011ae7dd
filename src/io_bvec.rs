use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::{Dimension, GradientSet, NhdrError, Result, Vec3};


/// read the gradient table next to a volume, prefix.bval and prefix.bvec. 3D volumes may come
/// without one (both files absent), 4D volumes always need both
pub fn read_gradients(prefix: impl AsRef<Path>, dimension: Dimension) -> Result<Option<GradientSet>> {
    let prefix = prefix.as_ref();
    let bval_file = with_suffix(prefix, "bval");
    let bvec_file = with_suffix(prefix, "bvec");
    if dimension == Dimension::Three && !bval_file.exists() && !bvec_file.exists() {
        info!("no gradient table for {}, writing a plain 3D header", prefix.display());
        return Ok(None);
    }
    let gradients = GradientSet::new(read_bvecs(&bvec_file)?, read_bvals(&bval_file)?)?;
    Ok(Some(gradients))
}

/// read b-values from a text file. All whitespace separated numbers are taken in order,
/// so both the single-row FSL layout and one value per line are accepted
pub fn read_bvals(file: impl AsRef<Path>) -> Result<Vec<f64>> {
    let txt = fs::read_to_string(file.as_ref())?;
    parse_bvals(&txt, file.as_ref())
}

/// read gradient directions from a text file. Either one vector per line, or the FSL
/// layout of 3 rows with one column per volume
pub fn read_bvecs(file: impl AsRef<Path>) -> Result<Vec<Vec3>> {
    let txt = fs::read_to_string(file.as_ref())?;
    parse_bvecs(&txt, file.as_ref())
}

pub fn parse_bvals(txt: &str, source: &Path) -> Result<Vec<f64>> {
    let mut bvals = vec![];
    for (line_no, line) in txt.lines().enumerate() {
        bvals.extend(parse_row(line, line_no + 1, source)?);
    }
    Ok(bvals)
}

pub fn parse_bvecs(txt: &str, source: &Path) -> Result<Vec<Vec3>> {
    // keep the line number with each row for error reporting
    let mut rows = vec![];
    for (line_no, line) in txt.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rows.push((line_no + 1, parse_row(line, line_no + 1, source)?));
    }

    if rows.len() == 3 {
        let n = rows[0].1.len();
        if let Some((line, row)) = rows.iter().find(|(_, r)| r.len() != n) {
            Err(malformed(source, *line, format!(
                "expected {} columns like the first row, got {}", n, row.len()
            )))?
        }
        return Ok((0..n).map(|j| [rows[0].1[j], rows[1].1[j], rows[2].1[j]]).collect());
    }

    rows.into_iter().map(|(line, row)| {
        <[f64; 3]>::try_from(row.as_slice()).map_err(|_| malformed(source, line, format!(
            "expected 3 components, got {}", row.len()
        )))
    }).collect()
}

fn parse_row(line: &str, line_no: usize, source: &Path) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().map_err(|e| malformed(source, line_no, format!("{token:?}: {e}"))))
        .collect()
}

fn malformed(source: &Path, line: usize, reason: String) -> NhdrError {
    NhdrError::Malformed {
        file: source.to_owned(),
        line,
        reason,
    }
}

/// append an extension to the full prefix, so "sub.01" becomes "sub.01.bval" rather than "sub.bval"
pub fn with_suffix(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
