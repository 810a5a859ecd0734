pub mod model;
pub mod service;

pub use model::{ImageRecord, NewImageRecord};
pub use service::{MetadataGateway, IMAGES_COLLECTION};
