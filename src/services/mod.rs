pub mod analysis;
pub mod generation;

pub use analysis::MoodAnalysisService;
pub use generation::CreatureGenerationService;
