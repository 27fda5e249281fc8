//! Certificate HTML rendering.
//!
//! The template and medal image are loaded once into [`CertificateAssets`]
//! and then shared read-only by every render. Loading fails fast on a
//! missing or corrupt asset so a bad deployment is caught at startup rather
//! than on the first request.

use std::error::Error as _;
use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera};

use crate::types::CertificateRequest;

/// File name of the certificate template inside the assets directory.
pub const TEMPLATE_FILE: &str = "certificate.html";

/// File name of the medal image inside the assets directory.
pub const MEDAL_FILE: &str = "medal.png";

/// Name the template is registered under. The `.html` suffix turns on
/// autoescaping for user-supplied values.
const TEMPLATE_NAME: &str = "certificate.html";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Errors raised while loading or rendering certificate assets.
///
/// All of these indicate a broken deployment, not a bad request.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read asset '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Medal asset '{path}' is not a PNG image")]
    NotAPng { path: PathBuf },

    #[error("Certificate template is invalid: {detail}")]
    InvalidTemplate { detail: String },

    #[error("Failed to render certificate template: {detail}")]
    Render { detail: String },
}

/// Values substituted into the certificate template for one render.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateContext {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// Issue date, `DD/MM/YYYY`.
    pub date: String,
    /// Base64-encoded medal image.
    pub medal: String,
}

/// Formats an issue date the way certificates print it (`DD/MM/YYYY`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Compiled template plus the pre-encoded medal image.
pub struct CertificateAssets {
    tera: Tera,
    medal_base64: String,
}

impl fmt::Debug for CertificateAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateAssets")
            .field("template", &TEMPLATE_NAME)
            .field("medal_base64_len", &self.medal_base64.len())
            .finish()
    }
}

impl CertificateAssets {
    /// Loads `certificate.html` and `medal.png` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        let template_path = dir.join(TEMPLATE_FILE);
        let template = std::fs::read_to_string(&template_path).map_err(|source| {
            AssetError::Read {
                path: template_path.clone(),
                source,
            }
        })?;

        let medal_path = dir.join(MEDAL_FILE);
        let medal = std::fs::read(&medal_path).map_err(|source| AssetError::Read {
            path: medal_path.clone(),
            source,
        })?;

        Self::build(&template, &medal, medal_path)
    }

    /// Builds assets from in-memory template source and medal bytes.
    pub fn from_parts(template: &str, medal: &[u8]) -> Result<Self, AssetError> {
        Self::build(template, medal, PathBuf::from(MEDAL_FILE))
    }

    fn build(template: &str, medal: &[u8], medal_path: PathBuf) -> Result<Self, AssetError> {
        if !medal.starts_with(&PNG_SIGNATURE) {
            return Err(AssetError::NotAPng { path: medal_path });
        }

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .map_err(|e| AssetError::InvalidTemplate {
                detail: describe(&e),
            })?;

        let assets = Self {
            tera,
            medal_base64: BASE64_STANDARD.encode(medal),
        };

        // A template referencing a variable we never provide only fails at
        // render time; surface that now.
        let probe = assets.context_for(
            &CertificateRequest::new("probe", "probe", "probe"),
            NaiveDate::MIN,
        );
        assets
            .render(&probe)
            .map_err(|e| AssetError::InvalidTemplate {
                detail: e.to_string(),
            })?;

        Ok(assets)
    }

    /// The medal image, base64-encoded.
    pub fn medal_base64(&self) -> &str {
        &self.medal_base64
    }

    /// Builds the template context for a request issued on `date`.
    pub fn context_for(&self, request: &CertificateRequest, date: NaiveDate) -> TemplateContext {
        TemplateContext {
            id: request.id.clone(),
            name: request.name.clone(),
            grade: request.grade.clone(),
            date: format_date(date),
            medal: self.medal_base64.clone(),
        }
    }

    /// Renders the certificate HTML for `context`.
    pub fn render(&self, context: &TemplateContext) -> Result<String, AssetError> {
        let context = Context::from_serialize(context).map_err(|e| AssetError::Render {
            detail: describe(&e),
        })?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| AssetError::Render {
                detail: describe(&e),
            })
    }
}

/// Flattens a tera error and its sources into one line.
fn describe(err: &tera::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    const TEMPLATE: &str = r#"<html><body>
<h1>{{ name }}</h1><p>{{ grade }}</p><p>{{ date | safe }}</p><small>{{ id }}</small>
<img src="data:image/png;base64,{{ medal | safe }}">
</body></html>"#;

    fn assets() -> CertificateAssets {
        CertificateAssets::from_parts(TEMPLATE, MINIMAL_PNG).unwrap()
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_date(date), "01/01/2024");
        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert_eq!(format_date(date), "25/12/2023");
    }

    #[test]
    fn test_render_substitutes_every_placeholder() {
        let assets = assets();
        let context = TemplateContext {
            id: "u1".to_string(),
            name: "Ada Lovelace".to_string(),
            grade: "A+".to_string(),
            date: "01/01/2024".to_string(),
            medal: "aGVsbG8=".to_string(),
        };

        let html = assets.render(&context).unwrap();
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("A+"));
        assert!(html.contains("01/01/2024"));
        assert!(html.contains("base64,aGVsbG8="));
        assert!(!html.contains("{{"));
        assert!(!html.contains("}}"));
    }

    #[test]
    fn test_render_escapes_user_values() {
        let assets = assets();
        let request = CertificateRequest::new("u1", "<script>alert(1)</script>", "A");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let html = assets.render(&assets.context_for(&request, date)).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let assets = assets();
        let request = CertificateRequest::new("u1", "Ada", "A");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let context = assets.context_for(&request, date);
        assert_eq!(assets.render(&context).unwrap(), assets.render(&context).unwrap());
    }

    #[test]
    fn test_context_for_inlines_medal() {
        let assets = assets();
        let request = CertificateRequest::new("u1", "Ada", "A");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let context = assets.context_for(&request, date);
        assert_eq!(context.date, "09/03/2024");
        assert_eq!(context.medal, BASE64_STANDARD.encode(MINIMAL_PNG));
    }

    #[test]
    fn test_rejects_non_png_medal() {
        let err = CertificateAssets::from_parts(TEMPLATE, b"GIF89a").unwrap_err();
        assert!(matches!(err, AssetError::NotAPng { .. }));
    }

    #[test]
    fn test_rejects_unparseable_template() {
        let err = CertificateAssets::from_parts("{{ name", MINIMAL_PNG).unwrap_err();
        assert!(matches!(err, AssetError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_rejects_template_with_unknown_variable() {
        let err = CertificateAssets::from_parts("{{ course }}", MINIMAL_PNG).unwrap_err();
        assert!(matches!(err, AssetError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = CertificateAssets::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TEMPLATE_FILE), TEMPLATE).unwrap();
        std::fs::write(dir.path().join(MEDAL_FILE), MINIMAL_PNG).unwrap();

        let assets = CertificateAssets::load(dir.path()).unwrap();
        assert_eq!(assets.medal_base64(), BASE64_STANDARD.encode(MINIMAL_PNG));
    }
}
