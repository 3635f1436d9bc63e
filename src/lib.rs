//! # Content Scorer
//!
//! 对一段文字同时运行多个独立分析器（偏见、可读性、情感），
//! 汇总成一个可复现的综合质量分和改进建议。
//!
//! ## 架构设计
//!
//! ### ① 远端客户端（Clients）
//! - `clients/` - 只负责和远端情感服务通信
//! - `LlmClient` - OpenAI 兼容接口（async-openai）
//! - `AsiOneClient` - ASI:One 接口（reqwest）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能分析什么"，每个分析器只处理一段文字
//! - `RuleBiasAnalyzer` - 规则偏见检测
//! - `ReadabilityAnalyzer` - 可读性指数
//! - `RemoteSentimentAnalyzer` - 远端情感 + 本地词典兜底
//! - `AnalyzerRegistry` - 启动时构建的分析器表
//!
//! ### ③ 打分层（Scoring）
//! - `scoring/` - 子分数归一化、权重重新归一化、建议规则表
//!
//! ### ④ 流程层（Workflow）
//! - `AnalysisFlow` - 一条内容的完整流程（校验 → 调度 → 打分）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 并发调用分析器，带超时地收集结果
//! - `orchestrator/batch_processor` - 批量内容处理器，管理并发和统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{AnalyzeConfig, Config, SentimentProviderKind, TimeoutPolicy, Timeouts};
pub use error::{AnalyzerError, AppError, AppResult};
pub use models::{
    AnalyzerKind, AnalyzerPayload, AnalyzerRequest, AnalyzerResult, ContentItem, OverallScore,
    ReportIssue, ResultBundle, ScoreReport,
};
pub use orchestrator::{App, Orchestrator};
pub use scoring::Weights;
pub use services::{Analyzer, AnalyzerRegistry, Locality};
pub use workflow::{AnalysisCtx, AnalysisFlow};
