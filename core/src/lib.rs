pub mod ai;
pub mod config;
pub mod entity;
pub mod glossary;
pub mod matcher;
pub mod merger;
pub mod normalize;
pub mod pipeline;
pub mod updater;

pub use ai::openai::OpenAiClient;
pub use ai::prompts::verified_terms_block;
pub use ai::{AiError, EntityExtractor, TermVerifier, Translator};
pub use config::{AppConfig, ConfigError, DropboxConfig, OpenAiConfig};
pub use entity::{Entity, EntityKind, Region, VerificationRecord, VerificationStatus};
pub use glossary::store::{DropboxStore, GlossaryStore, MemoryStore, StoreError};
pub use glossary::{GlossaryRecord, GlossaryTable};
pub use matcher::{match_entities, GlossaryStatus, MatchOutcome, MatchResult};
pub use merger::{merge_terms, CanonicalTerm};
pub use normalize::normalize;
pub use pipeline::{PipelineError, PipelineReport, TranslationPipeline};
pub use updater::append_new;
