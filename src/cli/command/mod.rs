pub mod convert;
pub mod download;

pub use convert::convert;
pub use download::{download, DownloadRequest};
