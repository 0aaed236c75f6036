pub mod handler;
pub mod models;
pub mod provider;
pub mod removebg;
pub mod secret;

pub use handler::{IMAGE_FIELD, create_removal_router, remove_background};
pub use models::{RemovalResponse, RemovedImage, UploadedImage};
pub use provider::{BackgroundRemover, RemovalError};
pub use removebg::RemoveBgClient;
pub use secret::{ApiKey, ApiKeySource};
