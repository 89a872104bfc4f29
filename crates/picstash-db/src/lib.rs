//! Picstash-DB: database schema, migrations, and query operations
//!
//! This crate provides database functionality for picstash using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use picstash_db::pool::{init_pool, get_conn};
//! use picstash_db::models::NewImage;
//! use picstash_db::queries::images;
//!
//! let pool = init_pool("/var/lib/picstash/picstash.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let record = NewImage {
//!     title: "Sunset".to_string(),
//!     image_url: "https://example.com/a.jpg".to_string(),
//!     ..Default::default()
//! };
//! let stored = images::insert_image(&conn, &record).unwrap();
//! println!("Stored image {}", stored.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
