use std::path::Path;
use approx::assert_relative_eq;
use dwi_nhdr::io_bvec::{parse_bvals, parse_bvecs};
use dwi_nhdr::render::write_nhdr;
use dwi_nhdr::{Encoding, GradientSet, NhdrDocument, NhdrError, VolumeMetadata, IDENTITY4};

const BVALS: &str = "0 1000 1000 1000 1000\n";
const BVECS: &str = "0 1 0 0 0.577\n0 0 1 0 0.577\n0 0 0 1 0.577\n";

fn dwi_volume() -> VolumeMetadata {
    VolumeMetadata::new(&[96, 96, 60, 5], IDENTITY4, &[2., 2., 2., 1000.], Encoding::Gzip, "dwi.nii.gz").unwrap()
}

#[test]
fn dwi_series_to_nhdr() {
    let bvals = parse_bvals(BVALS, Path::new("dwi.bval")).unwrap();
    let bvecs = parse_bvecs(BVECS, Path::new("dwi.bvec")).unwrap();
    let gradients = GradientSet::new(bvecs.clone(), bvals).unwrap();
    assert_eq!(gradients.reference_strength(), 1000.);

    let scaled = gradients.scaled();
    assert_eq!(scaled[0], [0., 0., 0.]);
    for (s, v) in scaled.iter().zip(bvecs.iter()).skip(1) {
        for k in 0..3 {
            assert_relative_eq!(s[k], v[k]);
        }
    }

    let doc = NhdrDocument::build(&dwi_volume(), Some(&gradients)).unwrap();
    let lines = doc.lines();
    assert!(lines.contains(&"dimension: 4".to_string()));
    assert_eq!(lines.iter().filter(|l| l.starts_with("measurement frame: ")).count(), 1);
    let labels: Vec<&str> = lines.iter()
        .filter_map(|l| l.strip_prefix("DWMRI_gradient_"))
        .map(|l| &l[0..4])
        .collect();
    assert_eq!(labels, ["0000", "0001", "0002", "0003", "0004"]);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dwi.nhdr");
    write_nhdr(&out, &doc).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), lines.len());
    assert!(written.contains("DWMRI_gradient_0004:=0.577   0.577   0.577\n"));
}

#[test]
fn all_zero_strengths_write_nothing() {
    let bvals = parse_bvals("0 0 0 0 0\n", Path::new("dwi.bval")).unwrap();
    let bvecs = parse_bvecs(BVECS, Path::new("dwi.bvec")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dwi.nhdr");

    let result = GradientSet::new(bvecs, bvals)
        .and_then(|g| NhdrDocument::build(&dwi_volume(), Some(&g)))
        .and_then(|doc| write_nhdr(&out, &doc));

    assert!(matches!(result, Err(NhdrError::DegenerateStrengths { count: 5 })));
    assert!(!out.exists());
}

#[test]
fn mismatched_table_and_strengths() {
    let bvals = parse_bvals("0 1000 1000\n", Path::new("dwi.bval")).unwrap();
    let bvecs = parse_bvecs(BVECS, Path::new("dwi.bvec")).unwrap();
    assert!(matches!(GradientSet::new(bvecs, bvals), Err(NhdrError::InputShape(_))));
}
