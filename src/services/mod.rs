pub mod atomic_write;
pub mod device_gate;
pub mod display_driver;
pub mod gallery;
pub mod image_store;
pub mod metadata_store;

pub use device_gate::{DeviceGate, GatePermit};
pub use display_driver::{pack_frame, DisplayDriver, DriverError, InkMap, SimulatedPanel, INK_CODES};
pub use gallery::{GalleryService, ImageListing, ImageSummary};
pub use image_store::{sanitize_name, validate_name, ImageStore, StoredImage};
pub use metadata_store::{MetadataStore, StoreError};
