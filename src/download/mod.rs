//! Fetching remote attachments into the library.
//!
//! - [`HttpClient`] streams a URL into a local file (the [`UrlFetcher`]
//!   capability; tests and front ends may inject their own)
//! - [`Downloader`] wraps a fetch into a [`BackgroundTask`](crate::task::BackgroundTask)
//!   that classifies the result and moves it to its generated name
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use linkfile_core::download::{Downloader, HttpClient, UrlDownload};
//! use linkfile_core::{BibEntry, ExternalFileTypes};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(Arc::new(HttpClient::new()), Arc::new(ExternalFileTypes::standard()));
//! let task = downloader.prepare_download_task(
//!     Path::new("./library"),
//!     UrlDownload {
//!         url: Url::parse("https://example.org/paper.pdf")?,
//!         entry: BibEntry::default().with_citation_key("Smith2020"),
//!         file_name_pattern: "[citationkey]".to_string(),
//!         directory_pattern: String::new(),
//!     },
//! );
//! task.on_success(|file| println!("saved {}", file.path.display())).run().await;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod downloader;
mod error;

pub use client::{FetchedResource, HttpClient, UrlFetcher};
pub use downloader::{DownloadedFile, Downloader, UrlDownload};
pub use error::DownloadError;
