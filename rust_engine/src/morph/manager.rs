//! Morph 管理器

use std::collections::HashMap;
use glam::Vec3;

use super::{MorphTarget, WeightSet};

/// Morph 管理器（id -> Morph 注册表）
#[derive(Debug, Default)]
pub struct MorphManager {
    morphs: HashMap<i32, MorphTarget>,
}

impl MorphManager {
    pub fn new() -> Self {
        Self {
            morphs: HashMap::new(),
        }
    }

    /// 添加 Morph，已存在同 id 时整体替换并返回旧值
    pub fn add_morph(&mut self, morph: MorphTarget) -> Option<MorphTarget> {
        self.morphs.insert(morph.id, morph)
    }

    /// 移除 Morph
    pub fn remove_morph(&mut self, id: i32) -> Option<MorphTarget> {
        self.morphs.remove(&id)
    }

    /// 清空所有 Morph
    pub fn clear(&mut self) {
        self.morphs.clear();
    }

    /// 获取 Morph 数量
    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }

    /// 获取 Morph
    pub fn get_morph(&self, id: i32) -> Option<&MorphTarget> {
        self.morphs.get(&id)
    }

    /// 把权重集合中的所有 Morph 叠加到平铺的顶点位置上
    ///
    /// `positions` 为 x0,y0,z0,x1,... 布局。权重为 0 或 id 未注册的条目直接跳过。
    /// 返回实际参与叠加的 Morph 数量。
    pub fn apply_morphs(&self, weights: &WeightSet, positions: &mut [f32], clamp_weights: bool) -> usize {
        let mut applied = 0;

        for (id, weight) in weights.iter() {
            // 先判断原始权重：0 与未传入等价，不受范围限制影响
            if weight == 0.0 {
                continue;
            }
            let Some(morph) = self.morphs.get(&id) else {
                continue;
            };

            let weight = if clamp_weights {
                morph.clamp_weight(weight)
            } else {
                weight
            };
            if weight == 0.0 {
                continue;
            }

            Self::apply_vertex_morph(morph, weight, positions);
            applied += 1;
        }

        applied
    }

    /// 应用顶点 Morph
    fn apply_vertex_morph(morph: &MorphTarget, weight: f32, positions: &mut [f32]) {
        for offset in &morph.vertex_offsets {
            let start = offset.vertex_index as usize * 3;
            // 关闭索引校验时越界顶点在这里跳过
            if let Some(slot) = positions.get_mut(start..start + 3) {
                let moved = Vec3::from_slice(slot) + offset.offset * weight;
                moved.write_to_slice(slot);
            }
        }
    }
}
