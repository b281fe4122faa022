//! Morph 变形系统
//!
//! 只处理顶点 Morph：每个 Morph 是一组稀疏的 (顶点索引, 偏移) 对，
//! 按权重叠加到基础形状上。

mod morph;
mod manager;
mod weights;

pub use morph::MorphTarget;
pub use manager::MorphManager;
pub use weights::WeightSet;

use glam::Vec3;

/// 顶点 Morph 偏移
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexMorphOffset {
    pub vertex_index: u32,
    pub offset: Vec3,
}

impl VertexMorphOffset {
    pub fn new(vertex_index: u32, offset: Vec3) -> Self {
        Self {
            vertex_index,
            offset,
        }
    }
}
