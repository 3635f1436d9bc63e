//! 维度权重

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ConfigError;
use crate::models::AnalyzerKind;

/// 权重之和允许的误差
const SUM_TOLERANCE: f64 = 1e-6;

/// 三个维度的权重，和为 1
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub bias: f64,
    pub readability: f64,
    pub sentiment: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            bias: 0.5,
            readability: 0.25,
            sentiment: 0.25,
        }
    }
}

impl Weights {
    pub fn get(&self, kind: AnalyzerKind) -> f64 {
        match kind {
            AnalyzerKind::Bias => self.bias,
            AnalyzerKind::Readability => self.readability,
            AnalyzerKind::Sentiment => self.sentiment,
        }
    }

    /// 每个权重非负且有限，总和约等于 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in AnalyzerKind::ALL {
            let value = self.get(kind);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    dimension: kind.to_string(),
                    value,
                });
            }
        }
        let sum: f64 = AnalyzerKind::ALL.iter().map(|&k| self.get(k)).sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }

    /// 在可用维度上重新归一化
    ///
    /// 没有可用维度，或可用维度的权重全为 0 时返回空表，由调用方判为无法评分。
    pub fn renormalize(&self, available: &BTreeSet<AnalyzerKind>) -> BTreeMap<AnalyzerKind, f64> {
        let total: f64 = available.iter().map(|&k| self.get(k)).sum();
        if total <= 0.0 {
            return BTreeMap::new();
        }
        available
            .iter()
            .map(|&k| (k, self.get(k) / total))
            .collect()
    }
}
