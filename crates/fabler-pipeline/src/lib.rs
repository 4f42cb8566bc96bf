//! Generation pipelines: prompt construction, model output parsing, and the
//! video orchestration flow.

pub mod prompt;
pub mod storytext;
pub mod translation;
pub mod video;

pub use prompt::StoryPreferences;
pub use storytext::ParsedStory;
pub use translation::TranslatedStory;
pub use video::{VideoArtifacts, VideoOrchestrator};
