//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory database and a fake
//! media store into a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use picstash::config::Config;
use picstash::images::ImageService;
use picstash::media::{MediaStore, UploadedMedia};
use picstash::server::{create_router, AppContext};
use picstash_common::{Error, Result};
use picstash_db::pool::{init_memory_pool, DbPool};

/// Media store double: returns a deterministic delivery URL per filename
/// and records delete calls. Set `fail_uploads` to make every upload
/// fail the way a rejecting or unreachable media host would.
#[derive(Default)]
pub struct FakeMediaStore {
    pub deleted: Mutex<Vec<String>>,
    pub fail_uploads: AtomicBool,
}

#[async_trait::async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload_image(&self, _bytes: Vec<u8>, filename: &str) -> Result<UploadedMedia> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::upload("Upload rejected (401): invalid signature"));
        }

        Ok(UploadedMedia {
            secure_url: format!("https://res.cloudinary.com/test/image/upload/{}", filename),
            public_id: format!("picstash/{}", filename),
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub media: Arc<FakeMediaStore>,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let media = Arc::new(FakeMediaStore::default());
        let images = Arc::new(ImageService::new(db.clone(), media.clone()));

        let ctx = AppContext {
            images,
            config: Arc::new(config),
        };

        Self { ctx, db, media }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}
