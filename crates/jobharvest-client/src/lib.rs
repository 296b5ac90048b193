pub mod http_navigator;
pub mod parser;
pub mod uploader;

#[cfg(feature = "browser")]
pub mod browser_navigator;

pub use http_navigator::HttpNavigator;
pub use parser::SeekParser;
pub use uploader::DropboxUploader;

#[cfg(feature = "browser")]
pub use browser_navigator::BrowserNavigator;
