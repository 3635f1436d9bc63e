pub mod content;
pub mod loaders;
pub mod outcome;
pub mod payload;
pub mod report;

pub use content::{AnalyzerKind, AnalyzerRequest, BiasChecks, ContentItem};
pub use loaders::{load_all_content_files, load_content_file};
pub use outcome::{AnalyzerResult, ResultBundle, NON_FINITE_PAYLOAD};
pub use payload::{AnalyzerPayload, BiasDirection, BiasPayload, ReadabilityPayload, SentimentPayload};
pub use report::{ContentSignals, OverallScore, ReportIssue, ScoreReport};
