// Certificate Core - shared types, storage addressing and HTML rendering

pub mod location;
pub mod template;
pub mod types;

pub use location::{ObjectLocation, DEFAULT_BUCKET, DEFAULT_REGION, PDF_CONTENT_TYPE};
pub use template::{format_date, AssetError, CertificateAssets, TemplateContext};
pub use types::{
    CertificateRequest, CertificateResponse, DecodeError, ErrorResponse,
    CERTIFICATE_CREATED_MESSAGE,
};
