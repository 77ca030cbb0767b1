use std::io::Cursor;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

use super::resolver::ResolvedLibrary;

const NATIVE_EXTENSIONS: &[&str] = &[".dll", ".so", ".dylib", ".jnilib"];

/// Unpack shared libraries from the native jars of `libraries` into
/// `natives_dir`, which is emptied first. Only top-level entries are
/// extracted; `META-INF` and nested paths are skipped.
///
/// A native jar that is missing or unreadable is logged and skipped so one
/// broken artifact does not block the launch.
pub async fn extract_natives(
    libraries: &[ResolvedLibrary],
    libraries_dir: &Path,
    natives_dir: &Path,
) -> LauncherResult<usize> {
    if natives_dir.exists() {
        let _ = tokio::fs::remove_dir_all(natives_dir).await;
    }
    tokio::fs::create_dir_all(natives_dir)
        .await
        .map_err(|e| LauncherError::io(natives_dir, e))?;

    let mut extracted = 0;

    for native in libraries.iter().filter_map(|lib| lib.native.as_ref()) {
        let jar_path = libraries_dir.join(&native.relative_path);
        let jar_bytes = match tokio::fs::read(&jar_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Native jar unavailable {:?}: {}", jar_path, e);
                continue;
            }
        };

        let dest_dir = natives_dir.to_path_buf();
        let count = tokio::task::spawn_blocking(move || unpack(jar_bytes, &dest_dir, &jar_path))
            .await
            .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))?;
        extracted += count;
    }

    debug!("Extracted {} native files into {:?}", extracted, natives_dir);
    Ok(extracted)
}

fn unpack(jar_bytes: Vec<u8>, dest_dir: &Path, jar_path: &Path) -> usize {
    let mut archive = match zip::ZipArchive::new(Cursor::new(jar_bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            warn!("Cannot open native jar {:?}: {}", jar_path, e);
            return 0;
        }
    };

    let mut count = 0;
    for i in 0..archive.len() {
        let Ok(mut file) = archive.by_index(i) else {
            continue;
        };
        let name = file.name().to_string();

        if name.contains("META-INF") || name.contains('/') || name.contains('\\') {
            continue;
        }
        if !NATIVE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            continue;
        }

        let dest = dest_dir.join(&name);
        let mut out = match std::fs::File::create(&dest) {
            Ok(out) => out,
            Err(e) => {
                warn!("Cannot create {:?}: {}", dest, e);
                continue;
            }
        };
        if std::io::copy(&mut file, &mut out).is_ok() {
            debug!("Extracted native: {}", name);
            count += 1;
        }
    }
    count
}

/// Remove the natives directory after the game exits.
pub async fn cleanup_natives(natives_dir: &Path) {
    if natives_dir.exists() {
        let _ = tokio::fs::remove_dir_all(natives_dir).await;
    }
}
