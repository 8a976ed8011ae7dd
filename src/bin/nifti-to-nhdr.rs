use std::path::PathBuf;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use dwi_nhdr::io_bvec::read_gradients;
use dwi_nhdr::io_nifti::{locate_volume, read_volume_metadata};
use dwi_nhdr::render::{nhdr_path, write_nhdr};
use dwi_nhdr::{NhdrDocument, Result};

/// Given a path prefix, writes a detached nrrd header (prefix.nhdr) for prefix.nii[.gz]
/// using the gradient table in prefix.bval and prefix.bvec
#[derive(Parser, Debug)]
struct Args {
    /// prefix for prefix.nii.gz (or prefix.nii), prefix.bval, and prefix.bvec files
    #[clap(short, long)]
    prefix: PathBuf,

    /// output header. Defaults to prefix.nhdr
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// log derived header fields
    #[clap(short, long)]
    verbose: bool,
}

fn main() {

    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }

}

fn run(args: &Args) -> Result<()> {

    let (nifti_file, encoding) = locate_volume(&args.prefix)?;
    let volume = read_volume_metadata(&nifti_file, encoding)?;
    info!("{} is {}D with sizes {:?}", nifti_file.display(), volume.dimension().ndims(), volume.sizes());

    let gradients = read_gradients(&args.prefix, volume.dimension())?;

    let doc = NhdrDocument::build(&volume, gradients.as_ref())?;

    let output = nhdr_path(&args.prefix, args.output.as_deref());
    write_nhdr(&output, &doc)
}
