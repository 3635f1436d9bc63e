//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `dispatcher` - 单条内容调度器
//! - 为每个启用的分析器派发一个并发任务
//! - 按分析器的预算限时等待，超时/报错/崩溃都归一成结果
//! - 只借用分析器表，不持有按内容变化的状态
//!
//! ### `batch_processor` - 批量内容处理器
//! - 加载内容目录下的全部内容（`Vec<ContentItem>`）
//! - 控制并发数量（Semaphore）
//! - 输出每条内容的报告和全局统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ContentItem>)
//!     ↓
//! workflow::AnalysisFlow (处理单条内容：校验 → 调度 → 打分)
//!     ↓
//! dispatcher::Orchestrator (并发调用分析器)
//!     ↓
//! services (能力层：bias / readability / sentiment)
//!     ↓
//! clients (远端情感服务)
//! ```

pub mod batch_processor;
pub mod dispatcher;

pub use batch_processor::{App, ProcessingStats};
pub use dispatcher::Orchestrator;
