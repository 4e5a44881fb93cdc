use super::render::{print_photo_list, print_report};
use super::setup::{Cli, Commands};
use anyhow::{bail, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use proppixapp::api::PhotosApi;
use proppixapp::config::PhotosConfig;
use proppixapp::model::LocalFile;
use proppixapp::store::fs::{FsBlobStore, FsRecordStore};
use proppixapp::store::StaticGate;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const TABLE_FILE: &str = "photos.json";

type FsApi = PhotosApi<FsBlobStore, FsRecordStore, StaticGate>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let api = init_api(&data_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(&api, cli.command))
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let dirs = ProjectDirs::from("", "", "proppix")
        .context("could not determine a data directory; pass --data-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn init_api(data_dir: &Path) -> Result<FsApi> {
    let config = PhotosConfig::load(data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), bucket = %config.bucket, "using data directory");

    let blobs = FsBlobStore::new(config.bucket_dir(data_dir), config.public_base_url.clone());
    let records = FsRecordStore::new(data_dir.join(TABLE_FILE));
    // The CLI runs as the local administrator.
    Ok(PhotosApi::new(blobs, records, StaticGate(true), config))
}

async fn dispatch(api: &FsApi, command: Commands) -> Result<()> {
    match command {
        Commands::List { property } => {
            let photos = api.list(property).await?;
            print_photo_list(&photos);
        }
        Commands::Add { property, files } => {
            let files = files
                .iter()
                .map(|path| read_local_file(path))
                .collect::<Result<Vec<_>>>()?;
            let report = api.upload_now(property, files).await?;
            print_report(&report);
        }
        Commands::Move {
            property,
            position,
            direction,
        } => {
            let report = api
                .move_now(property, to_index(position)?, direction.into())
                .await?;
            print_report(&report);
        }
        Commands::Promote { property, position } => {
            let report = api.promote_now(property, to_index(position)?).await?;
            print_report(&report);
        }
        Commands::Remove { property, position } => {
            let report = api.remove_now(property, to_index(position)?).await?;
            print_report(&report);
        }
    }
    Ok(())
}

fn to_index(position: usize) -> Result<usize> {
    if position == 0 {
        bail!("positions start at 1");
    }
    Ok(position - 1)
}

fn read_local_file(path: &Path) -> Result<LocalFile> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let mime = guess_mime(path);
    Ok(LocalFile::new(name, mime, bytes))
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(to_index(1).unwrap(), 0);
        assert!(to_index(0).is_err());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a/Front.JPG")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("plan.pdf")), Some("application/pdf"));
        assert_eq!(guess_mime(Path::new("notes")), None);
    }

    #[test]
    fn reads_local_file_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garden.png");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let file = read_local_file(&path).unwrap();
        assert_eq!(file.name, "garden.png");
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
        assert_eq!(file.size(), 3);
    }
}
