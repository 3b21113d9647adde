pub mod model_persistence;
pub mod repositories;

pub use model_persistence::ModelArtifactStore;
pub use repositories::InMemorySessionRepository;
