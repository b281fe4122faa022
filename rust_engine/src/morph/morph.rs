//! Morph 定义

use glam::Vec3;

use super::VertexMorphOffset;

/// 默认权重下限
pub const DEFAULT_MIN_WEIGHT: f32 = 0.0;
/// 默认权重上限
pub const DEFAULT_MAX_WEIGHT: f32 = 1.0;

/// Morph 目标
///
/// 注册后不可变；相同 id 再次注册会整体替换。
#[derive(Clone, Debug, PartialEq)]
pub struct MorphTarget {
    pub id: i32,
    pub vertex_offsets: Vec<VertexMorphOffset>,

    // 仅在 EngineConfig::clamp_weights 开启时使用
    pub min_weight: f32,
    pub max_weight: f32,
}

impl MorphTarget {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            vertex_offsets: Vec::new(),
            min_weight: DEFAULT_MIN_WEIGHT,
            max_weight: DEFAULT_MAX_WEIGHT,
        }
    }

    /// 设置权重范围，上下限顺序颠倒时自动交换
    pub fn with_range(mut self, min_weight: f32, max_weight: f32) -> Self {
        self.min_weight = min_weight.min(max_weight);
        self.max_weight = min_weight.max(max_weight);
        self
    }

    /// 添加顶点偏移
    pub fn push_offset(&mut self, vertex_index: u32, offset: Vec3) {
        self.vertex_offsets
            .push(VertexMorphOffset::new(vertex_index, offset));
    }

    /// 获取受影响的顶点数量
    pub fn offset_count(&self) -> usize {
        self.vertex_offsets.len()
    }

    /// 最大顶点索引，空 Morph 返回 None
    pub fn max_vertex_index(&self) -> Option<u32> {
        self.vertex_offsets.iter().map(|o| o.vertex_index).max()
    }

    /// 把权重限制到 [min_weight, max_weight]
    ///
    /// 不使用 f32::clamp，NaN 权重不应导致 panic。
    pub fn clamp_weight(&self, weight: f32) -> f32 {
        weight.max(self.min_weight).min(self.max_weight)
    }
}
