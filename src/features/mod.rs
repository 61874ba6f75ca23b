/// Feature engineering: training table construction and the shared
/// column layout used at inference time.
pub mod builder;
pub mod encoding;
pub mod schema;

pub use builder::{FeatureTable, TrainingRow, build_features};
pub use encoding::LabelEncoder;
pub use schema::{BaseFeatures, FeatureMap, FeatureSchema};
