//! SPIFFS flash partition mounted at `/flash`.
//!
//! Logical paths (`/assets/about.txt`, `/storage/notes.txt`) are resolved
//! under the mount point. SPIFFS is flat, so directory listings are built
//! from the object names.

use std::ffi::CString;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use esp_idf_svc::sys::{self, EspError};
use flipper_ui::filesystem::{basename, list_flat_directory, resolve_mount_path};
use flipper_ui::{FileInfo, FileSystem, FileSystemError};

const FLASH_MOUNT_POINT: &str = "/flash";
const FLASH_MAX_FILES: usize = 8;

#[derive(Debug)]
pub enum StorageError {
    InvalidPath,
    Mount(EspError),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::InvalidPath => write!(f, "Invalid mount path"),
            StorageError::Mount(e) => write!(f, "SPIFFS mount failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

pub struct FlashStorage {
    base_path: String,
}

impl FlashStorage {
    /// Register the default SPIFFS partition with the VFS.
    pub fn mount() -> Result<Self, StorageError> {
        let base_path = FLASH_MOUNT_POINT.to_string();
        let c_base = CString::new(base_path.clone()).map_err(|_| StorageError::InvalidPath)?;

        let conf = sys::esp_vfs_spiffs_conf_t {
            base_path: c_base.as_ptr(),
            partition_label: core::ptr::null(),
            max_files: FLASH_MAX_FILES,
            format_if_mount_failed: false,
        };
        sys::esp!(unsafe { sys::esp_vfs_spiffs_register(&conf) }).map_err(StorageError::Mount)?;

        let mut total = 0usize;
        let mut used = 0usize;
        let res = unsafe { sys::esp_spiffs_info(core::ptr::null(), &mut total, &mut used) };
        if res == sys::ESP_OK {
            log::info!("SPIFFS mounted at {}: {}/{} bytes used", base_path, used, total);
        } else {
            log::info!("SPIFFS mounted at {}", base_path);
        }

        Ok(Self { base_path })
    }

    fn host_path(&self, path: &str) -> String {
        resolve_mount_path(path, &self.base_path)
    }

    /// Every object on the partition as (name relative to the mount, size).
    fn objects(&self) -> Result<Vec<(String, u64)>, FileSystemError> {
        let mut objects = Vec::new();
        for entry in fs::read_dir(&self.base_path).map_err(to_fs_error)? {
            let entry = entry.map_err(to_fs_error)?;
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            objects.push((entry.file_name().to_string_lossy().to_string(), size));
        }
        Ok(objects)
    }
}

fn to_fs_error(err: std::io::Error) -> FileSystemError {
    match err.kind() {
        ErrorKind::NotFound => FileSystemError::NotFound,
        ErrorKind::PermissionDenied => FileSystemError::PermissionDenied,
        _ => FileSystemError::IoError(format!("{:?}", err)),
    }
}

impl FileSystem for FlashStorage {
    fn list_files(&mut self, path: &str) -> Result<Vec<FileInfo>, FileSystemError> {
        list_flat_directory(self.objects()?, path).ok_or(FileSystemError::NotFound)
    }

    fn read_file(&mut self, path: &str) -> Result<String, FileSystemError> {
        fs::read_to_string(self.host_path(path)).map_err(to_fs_error)
    }

    fn exists(&mut self, path: &str) -> bool {
        self.file_info(path).is_ok()
    }

    fn file_info(&mut self, path: &str) -> Result<FileInfo, FileSystemError> {
        if let Ok(meta) = fs::metadata(self.host_path(path)) {
            return Ok(FileInfo {
                name: basename(path).to_string(),
                size: meta.len(),
                is_directory: false,
            });
        }
        list_flat_directory(self.objects()?, path)
            .map(|_| FileInfo {
                name: Path::new(path)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| "/".to_string()),
                size: 0,
                is_directory: true,
            })
            .ok_or(FileSystemError::NotFound)
    }
}
