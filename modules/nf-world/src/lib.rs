pub mod cluster;
pub mod country;
pub mod hub;
pub mod payload;
pub mod records;
pub mod seed;
pub mod source;
pub mod video;

pub use cluster::Cluster;
pub use country::CountryRecord;
pub use hub::Hub;
pub use payload::{NarrativePayload, Section};
pub use seed::Seed;
pub use source::{CuratedSourceSet, RawSource, SourceKind};
pub use video::{Act, VideoNarrative};
