//! 打分层
//!
//! 把结果包变成评分报告：子分数归一化、权重重新归一化、按规则表生成建议。

pub mod aggregator;
pub mod normalize;
pub mod recommend;
pub mod weights;

pub use aggregator::score;
pub use weights::Weights;
