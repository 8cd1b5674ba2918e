use crate::host::EmulatorEnvironment;
use relative_path::RelativePathBuf;
use std::fs;
use std::path::{Path, PathBuf};

/// Folders the engine expects under the data directory.
pub const REQUIRED_FOLDERS: &[&str] = &[
    "drives/c",
    "drives/d",
    "drives/e",
    "drives/z",
    "roms",
    "apps",
    "compat",
    "scripts",
];

pub const APPS_FOLDER: &str = "apps";

const PACKAGE_EXTENSIONS: &[&str] = &["sis", "sisx"];

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data directory: {0}")]
    InvalidDataDir(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    /// Already unpacked into its own folder
    Installed,
    /// Package file waiting to be installed
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    pub name: String,
    pub relative_path: RelativePathBuf,
    pub kind: AppKind,
}

/// Check that the data directory is usable. A missing directory is fine;
/// `initialize_folders` creates it.
pub fn validate_data_dir(data_dir: &Path) -> Result<(), IoError> {
    if data_dir.exists() && !data_dir.is_dir() {
        return Err(IoError::InvalidDataDir(format!(
            "{} is not a directory",
            data_dir.display()
        )));
    }
    Ok(())
}

pub fn initialize_folders(data_dir: &Path) -> Result<(), IoError> {
    validate_data_dir(data_dir)?;
    for folder in REQUIRED_FOLDERS {
        let path = data_dir.join(folder);
        if !path.is_dir() {
            log::info!("Creating emulator folder {}", path.display());
            fs::create_dir_all(&path)?;
        }
    }
    Ok(())
}

/// List apps under `<data_dir>/apps`, sorted by name.
pub fn scan_apps(data_dir: &Path) -> Result<Vec<InstalledApp>, IoError> {
    let apps_dir = data_dir.join(APPS_FOLDER);
    if !apps_dir.is_dir() {
        return Err(IoError::NotFound(apps_dir));
    }

    let mut apps = Vec::new();
    for entry in fs::read_dir(&apps_dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();

        // Skip hidden entries
        if file_name.starts_with('.') {
            continue;
        }

        let kind = if path.is_dir() {
            AppKind::Installed
        } else if is_package(&path) {
            AppKind::Package
        } else {
            continue;
        };

        let name = match kind {
            AppKind::Installed => file_name.clone(),
            AppKind::Package => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone()),
        };

        apps.push(InstalledApp {
            name,
            relative_path: RelativePathBuf::from(APPS_FOLDER).join(&file_name),
            kind,
        });
    }

    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(apps)
}

fn is_package(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            PACKAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Emulator environment rooted at a resolved data directory.
#[derive(Debug, Clone)]
pub struct DataDirEnvironment {
    data_dir: PathBuf,
}

impl DataDirEnvironment {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl EmulatorEnvironment for DataDirEnvironment {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn initialize_folders(&self) -> Result<(), IoError> {
        initialize_folders(&self.data_dir)
    }
}
