//! Morph 权重集合

use std::collections::HashMap;

use crate::{MorphError, Result};

/// 稀疏权重映射：Morph id -> 权重
///
/// 同一 id 多次写入时以最后一次为准。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightSet {
    weights: HashMap<i32, f32>,
}

impl WeightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由平行的 id / 权重数组构建
    pub fn from_pairs(ids: &[i32], weights: &[f32]) -> Result<Self> {
        if ids.len() != weights.len() {
            return Err(MorphError::WeightCountMismatch {
                ids: ids.len(),
                weights: weights.len(),
            });
        }
        Ok(ids.iter().copied().zip(weights.iter().copied()).collect())
    }

    /// 设置权重
    pub fn set(&mut self, id: i32, weight: f32) {
        self.weights.insert(id, weight);
    }

    /// 获取权重
    pub fn get(&self, id: i32) -> Option<f32> {
        self.weights.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.weights.iter().map(|(&id, &weight)| (id, weight))
    }
}

impl FromIterator<(i32, f32)> for WeightSet {
    fn from_iter<I: IntoIterator<Item = (i32, f32)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, weight) in iter {
            set.set(id, weight);
        }
        set
    }
}
