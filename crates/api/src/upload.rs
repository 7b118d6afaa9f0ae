//! Multipart extractor for the add-project form.
//!
//! Consumes the multipart body, stores the image under the upload directory,
//! and hands the handler the text fields plus the stored image's relative
//! path. Malformed bodies and unsupported files are rejected with 400.

use std::path::{Path, PathBuf};

use axum::extract::{FromRequest, Multipart, Request};
use folio_core::validation::validate_name;

use crate::error::AppError;
use crate::state::AppState;

/// Image extensions accepted for project covers.
///
/// Raster formats only. Uploads are served from the site origin, and SVG can
/// carry script.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL prefix the upload directory is served under.
pub const UPLOAD_URL_PREFIX: &str = "upload";

/// Multipart field names used by the add-project form.
pub mod fields {
    pub const NAME: &str = "inputName";
    pub const START_DATE: &str = "start-date";
    pub const END_DATE: &str = "end-date";
    pub const DESCRIPTION: &str = "description";
    pub const TECHNOLOGIES: &str = "technologies[]";
    pub const IMAGE: &str = "input-image";
}

/// An image written to the upload directory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Where the file lives on disk.
    pub file_path: PathBuf,
    /// Path stored on the project row and used in `<img src="/...">`.
    pub relative_path: String,
}

impl UploadedImage {
    /// Remove the stored file after the handler rejects the rest of the form.
    pub async fn discard(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.file_path).await {
            tracing::warn!(path = %self.file_path.display(), error = %e, "Failed to remove rejected upload");
        }
    }
}

/// Parsed add-project form.
///
/// Dates are kept as raw strings so the handler can report parse failures
/// with field-specific messages.
#[derive(Debug, Clone)]
pub struct ProjectUpload {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub image: UploadedImage,
}

impl FromRequest<AppState> for ProjectUpload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut name = String::new();
        let mut start_date = String::new();
        let mut end_date = String::new();
        let mut description = String::new();
        let mut technologies = Vec::new();
        let mut image: Option<(String, Vec<u8>)> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let field_name = field.name().unwrap_or("").to_string();
            if field_name == fields::IMAGE {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !filename.is_empty() && !data.is_empty() {
                    image = Some((filename, data.to_vec()));
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match field_name.as_str() {
                fields::NAME => name = text,
                fields::START_DATE => start_date = text,
                fields::END_DATE => end_date = text,
                fields::DESCRIPTION => description = text,
                fields::TECHNOLOGIES => technologies.push(text),
                _ => {} // ignore unknown fields
            }
        }

        let name = validate_name("Project name", &name)?;

        let (filename, data) = image.ok_or_else(|| {
            AppError::BadRequest(format!("Missing required '{}' file", fields::IMAGE))
        })?;
        let ext = image_extension(&filename)?;
        let image = store_image(&state.config.upload_dir, &ext, &data).await?;

        tracing::debug!(path = %image.relative_path, bytes = data.len(), "Stored project image");

        Ok(ProjectUpload {
            name,
            start_date,
            end_date,
            description,
            technologies,
            image,
        })
    }
}

/// Lowercased extension of `filename` if it is a supported image type.
pub fn image_extension(filename: &str) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

/// Write `data` to a freshly named file in `dir`.
async fn store_image(dir: &Path, ext: &str, data: &[u8]) -> Result<UploadedImage, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let stored_filename = format!("{}.{ext}", uuid::Uuid::new_v4());
    let file_path = dir.join(&stored_filename);
    tokio::fs::write(&file_path, data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(UploadedImage {
        file_path,
        relative_path: format!("{UPLOAD_URL_PREFIX}/{stored_filename}"),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert_eq!(image_extension("cover.PNG").unwrap(), "png");
        assert_eq!(image_extension("photo.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn rejects_unknown_or_missing_extension() {
        assert_matches!(image_extension("script.sh"), Err(AppError::BadRequest(_)));
        assert_matches!(image_extension("noext"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_svg_in_any_case() {
        assert_matches!(image_extension("logo.svg"), Err(AppError::BadRequest(_)));
        assert_matches!(image_extension("logo.SVG"), Err(AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn stored_image_is_written_and_discardable() {
        let dir = tempfile::tempdir().unwrap();
        let image = store_image(dir.path(), "png", b"fake-png").await.unwrap();

        assert!(image.relative_path.starts_with("upload/"));
        assert!(image.relative_path.ends_with(".png"));
        assert_eq!(tokio::fs::read(&image.file_path).await.unwrap(), b"fake-png");

        image.discard().await;
        assert!(!image.file_path.exists());
    }
}
