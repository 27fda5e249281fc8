//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use certificate_core::{CertificateAssets, ObjectLocation};

use crate::config::Config;
use crate::db;
use crate::entitlements::{DynamoEntitlementTable, EntitlementTable, PgEntitlementTable};
use crate::pdf::{ChromiumEngine, PdfOptions, RenderEngine, RenderLimits};
use crate::storage::{ObjectStore, S3ObjectStore};

/// How and where certificates are rendered and published.
#[derive(Debug, Clone, Default)]
pub struct PublishSettings {
    pub location: ObjectLocation,
    pub pdf_options: PdfOptions,
    pub limits: RenderLimits,
    /// Local path each PDF is also written to (offline mode only).
    pub offline_copy: Option<PathBuf>,
}

/// State shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub entitlements: Arc<dyn EntitlementTable>,
    pub objects: Arc<dyn ObjectStore>,
    pub renderer: Arc<dyn RenderEngine>,
    /// Loaded once at startup, read-only afterwards.
    pub assets: Arc<CertificateAssets>,
    pub publishing: PublishSettings,
}

impl AppState {
    pub fn new(
        entitlements: Arc<dyn EntitlementTable>,
        objects: Arc<dyn ObjectStore>,
        renderer: Arc<dyn RenderEngine>,
        assets: Arc<CertificateAssets>,
    ) -> Self {
        Self {
            entitlements,
            objects,
            renderer,
            assets,
            publishing: PublishSettings::default(),
        }
    }

    pub fn with_publishing(mut self, publishing: PublishSettings) -> Self {
        self.publishing = publishing;
        self
    }

    /// Builds production state: loads assets, connects the entitlement
    /// table and object store, and prepares the browser engine.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let assets = CertificateAssets::load(&config.assets_dir).with_context(|| {
            format!("Failed to load certificate assets from '{}'", config.assets_dir.display())
        })?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.location.region.clone()))
            .load()
            .await;

        let entitlements: Arc<dyn EntitlementTable> = match &config.database_url {
            Some(database_url) => {
                let pool = db::create_pool(database_url)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Using PostgreSQL entitlement table");
                Arc::new(PgEntitlementTable::new(pool))
            }
            None => {
                tracing::info!(table = %config.table_name, "Using DynamoDB entitlement table");
                Arc::new(DynamoEntitlementTable::from_sdk_config(
                    &sdk_config,
                    config.dynamodb_endpoint.as_deref(),
                    config.table_name.clone(),
                ))
            }
        };

        let objects = Arc::new(S3ObjectStore::from_sdk_config(
            &sdk_config,
            config.s3_endpoint.as_deref(),
            config.location.bucket.clone(),
        ));

        let renderer = Arc::new(ChromiumEngine::new(config.chrome_executable.clone()));

        let publishing = PublishSettings {
            location: config.location.clone(),
            pdf_options: PdfOptions::default(),
            limits: config.limits,
            offline_copy: config.offline_copy(),
        };

        Ok(Self::new(entitlements, objects, renderer, Arc::new(assets)).with_publishing(publishing))
    }
}
