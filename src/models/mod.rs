// Data models for members, measurements and derived views

pub mod backup;
pub mod measurement;
pub mod member;
pub mod prediction;
pub mod timeline;

pub use backup::*;
pub use measurement::*;
pub use member::*;
pub use prediction::*;
pub use timeline::*;
