mod client;
mod fetch;

pub use client::{DownloadEntry, Downloader};
pub use fetch::{fetch_libraries, plan_downloads, FetchReport};
