use actix_web::{post, web, HttpResponse};
use courserec_common::CourseRecError;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ExportRequest, ExportResponse};

/// Resolve the export target inside the configured export directory
///
/// # Arguments
/// * `export_path` - Configured export file; its parent is the export directory
/// * `file_name` - Optional bare file name supplied by the client
///
/// # Errors
/// `InvalidInput` when `file_name` is empty, absolute, contains a path
/// separator or refers to `.`/`..`
pub fn resolve_export_path(
    export_path: &Path,
    file_name: Option<&str>,
) -> Result<PathBuf, CourseRecError> {
    let Some(name) = file_name else {
        return Ok(export_path.to_path_buf());
    };

    let mut components = Path::new(name).components();
    let is_bare_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.trim().is_empty() || name.contains(['/', '\\']) || !is_bare_name {
        warn!("Rejected export file name: {:?}", name);
        return Err(CourseRecError::invalid_input(format!(
            "Export file name must be a plain file name, got '{}'",
            name
        )));
    }

    let dir = export_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(name))
}

/// Save the processed (flattened) corpus as CSV
#[post("/export")]
pub async fn export(
    req: Option<web::Json<ExportRequest>>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let file_name = req.and_then(|r| r.into_inner().file_name);
    let path = resolve_export_path(&state.config.export_path, file_name.as_deref())?;

    info!("Exporting processed corpus to {}", path.display());

    let engine = Arc::clone(&state.engine);
    let target = path.clone();
    tokio::task::spawn_blocking(move || engine.export(&target))
        .await
        .map_err(|e| CourseRecError::internal(format!("Export task failed: {}", e)))??;

    let rows = state.engine.corpus().len();
    Ok(HttpResponse::Ok().json(ExportResponse {
        success: true,
        path: path.display().to_string(),
        rows,
        message: format!("Processed data saved as '{}'", path.display()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_path() {
        let configured = Path::new("/srv/data/processed_courses.csv");
        assert_eq!(resolve_export_path(configured, None).unwrap(), configured);
    }

    #[test]
    fn test_resolve_joins_file_name_under_export_dir() {
        let configured = Path::new("/srv/data/processed_courses.csv");
        assert_eq!(
            resolve_export_path(configured, Some("snapshot.csv")).unwrap(),
            PathBuf::from("/srv/data/snapshot.csv")
        );
        assert_eq!(
            resolve_export_path(Path::new("processed.csv"), Some("snapshot.csv")).unwrap(),
            PathBuf::from("snapshot.csv")
        );
    }

    #[test]
    fn test_resolve_rejects_paths() {
        let configured = Path::new("/srv/data/processed_courses.csv");
        for name in [
            "",
            "  ",
            ".",
            "..",
            "../owned.csv",
            "/etc/owned.csv",
            "sub/owned.csv",
            "sub\\owned.csv",
        ] {
            let err = resolve_export_path(configured, Some(name)).unwrap_err();
            assert!(
                matches!(err, CourseRecError::InvalidInput(_)),
                "{:?} was accepted",
                name
            );
        }
    }
}
