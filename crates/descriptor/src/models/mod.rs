mod metadata;
mod platform;
mod shape;

pub use self::metadata::ModMetadata;
pub use self::platform::PlatformVersion;
pub use self::shape::{DescriptorShape, SpecialCase};
