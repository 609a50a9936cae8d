pub mod config;
pub mod error;
pub mod feature;
pub mod server;
pub mod store;

pub use config::{RestConfig, VoteboardConfig};
pub use error::{VoteboardError, VoteboardResult};
pub use feature::{Feature, NewFeature, DEFAULT_CATEGORY};
pub use server::VoteboardServer;
pub use store::FeatureStore;
