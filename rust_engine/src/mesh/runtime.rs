//! 网格运行时：基础形状 + Morph 叠加

use glam::Vec3;
use rayon::prelude::*;

use crate::config::{get_config, EngineConfig};
use crate::morph::{MorphManager, MorphTarget, WeightSet};
use crate::{MorphError, Result};

use super::{BYTES_PER_VERTEX, COMPONENTS_PER_VERTEX};

/// 并行重置时每块的浮点数个数（4096 个顶点）
const RESET_CHUNK: usize = 4096 * COMPONENTS_PER_VERTEX;

/// Morph 混合网格
///
/// `base` 创建后不再修改；`current` 每次 `update` 都从 `base` 完整重算，
/// 因此结果只取决于基础形状、注册表和传入的权重。
#[derive(Debug)]
pub struct BlendMesh {
    base: Vec<f32>,
    current: Vec<f32>,
    morph_manager: MorphManager,
    config: EngineConfig,
    debug_logged: bool,
}

impl BlendMesh {
    /// 使用当前全局配置创建网格
    pub fn new(base: &[f32]) -> Result<Self> {
        Self::with_config(base, get_config())
    }

    /// 使用指定配置创建网格
    pub fn with_config(base: &[f32], config: EngineConfig) -> Result<Self> {
        if base.len() % COMPONENTS_PER_VERTEX != 0 {
            return Err(MorphError::InvalidGeometry { len: base.len() });
        }

        Ok(Self {
            base: base.to_vec(),
            current: base.to_vec(),
            morph_manager: MorphManager::new(),
            config,
            debug_logged: false,
        })
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.base.len() / COMPONENTS_PER_VERTEX
    }

    /// 获取已注册的 Morph 数量
    pub fn morph_target_count(&self) -> usize {
        self.morph_manager.morph_count()
    }

    /// 当前（已叠加 Morph 的）顶点位置，平铺布局
    pub fn positions(&self) -> &[f32] {
        &self.current
    }

    /// 基础顶点位置，平铺布局
    pub fn base_positions(&self) -> &[f32] {
        &self.base
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn morph_manager(&self) -> &MorphManager {
        &self.morph_manager
    }

    /// 输出缓冲区所需字节数
    pub fn byte_len(&self) -> usize {
        self.vertex_count() * BYTES_PER_VERTEX
    }

    /// 由平行数组注册 Morph
    ///
    /// `deltas` 长度必须是 `indices` 的 3 倍。失败时注册表保持不变。
    pub fn add_morph_target(&mut self, id: i32, indices: &[i32], deltas: &[f32]) -> Result<()> {
        let target = self.build_morph_target(id, indices, deltas)?;
        self.insert_morph_target(target)
    }

    /// 由平行数组注册带权重范围的 Morph
    ///
    /// 范围只在 `EngineConfig::clamp_weights` 开启时生效。
    pub fn add_morph_target_with_range(
        &mut self,
        id: i32,
        indices: &[i32],
        deltas: &[f32],
        min_weight: f32,
        max_weight: f32,
    ) -> Result<()> {
        let target = self
            .build_morph_target(id, indices, deltas)?
            .with_range(min_weight, max_weight);
        self.insert_morph_target(target)
    }

    fn build_morph_target(&self, id: i32, indices: &[i32], deltas: &[f32]) -> Result<MorphTarget> {
        if deltas.len() != indices.len() * COMPONENTS_PER_VERTEX {
            return Err(MorphError::InvalidTarget {
                id,
                indices: indices.len(),
                deltas: deltas.len(),
            });
        }

        let vertex_count = self.vertex_count();
        let mut target = MorphTarget::new(id);
        target.vertex_offsets.reserve(indices.len());
        let mut dropped = 0usize;

        for (&index, delta) in indices.iter().zip(deltas.chunks_exact(COMPONENTS_PER_VERTEX)) {
            if index < 0 {
                if self.config.validate_indices {
                    return Err(MorphError::IndexOutOfRange {
                        id,
                        index: i64::from(index),
                        vertex_count,
                    });
                }
                dropped += 1;
                continue;
            }
            target.push_offset(index as u32, Vec3::from_slice(delta));
        }

        if dropped > 0 {
            log::warn!("Morph {} 丢弃了 {} 个负顶点索引", id, dropped);
        }

        Ok(target)
    }

    /// 注册已构建的 Morph，同 id 整体替换
    pub fn insert_morph_target(&mut self, target: MorphTarget) -> Result<()> {
        if self.config.validate_indices {
            let vertex_count = self.vertex_count();
            if let Some(max) = target.max_vertex_index() {
                if max as usize >= vertex_count {
                    return Err(MorphError::IndexOutOfRange {
                        id: target.id,
                        index: i64::from(max),
                        vertex_count,
                    });
                }
            }
        }

        log::debug!(
            "注册 Morph {}: {} 个顶点偏移",
            target.id,
            target.offset_count()
        );
        self.morph_manager.add_morph(target);
        Ok(())
    }

    /// 移除 Morph，返回是否存在
    pub fn remove_morph_target(&mut self, id: i32) -> bool {
        self.morph_manager.remove_morph(id).is_some()
    }

    /// 清空所有 Morph
    pub fn clear_morph_targets(&mut self) {
        self.morph_manager.clear();
    }

    /// 重算顶点：current = base + Σ weight * delta
    pub fn update(&mut self, weights: &WeightSet) {
        self.reset_positions();

        let applied = self.morph_manager.apply_morphs(
            weights,
            &mut self.current,
            self.config.clamp_weights,
        );

        // 调试日志（只在首次执行）
        if !self.debug_logged {
            self.debug_logged = true;
            log::info!(
                "Morph Debug: vertex_count={}, morph_count={}, active={}",
                self.vertex_count(),
                self.morph_target_count(),
                applied,
            );
        }
        if self.config.debug_log {
            log::debug!("Morph 更新: {} 个权重, {} 个生效", weights.len(), applied);
        }
    }

    /// 把 current 按本机浮点布局写入 `output`
    ///
    /// 容量不足时返回 `BufferTooSmall`，`output` 不会被修改。
    pub fn write_to(&self, output: &mut [u8]) -> Result<usize> {
        let bytes: &[u8] = bytemuck::cast_slice(&self.current[..]);
        if output.len() < bytes.len() {
            return Err(MorphError::BufferTooSmall {
                required: bytes.len(),
                capacity: output.len(),
            });
        }

        output[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// current := base，大网格使用 rayon 分块并行拷贝
    fn reset_positions(&mut self) {
        if self.vertex_count() >= self.config.parallel_threshold {
            self.current
                .par_chunks_mut(RESET_CHUNK)
                .zip(self.base.par_chunks(RESET_CHUNK))
                .for_each(|(dst, src)| dst.copy_from_slice(src));
        } else {
            self.current.copy_from_slice(&self.base);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vertex_mesh() -> BlendMesh {
        BlendMesh::with_config(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], EngineConfig::default()).unwrap()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_invalid_geometry() {
        let err = BlendMesh::with_config(&[0.0; 4], EngineConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, MorphError::InvalidGeometry { len: 4 });
    }

    #[test]
    fn test_current_equals_base_after_creation() {
        let mesh = two_vertex_mesh();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.positions(), mesh.base_positions());
    }

    #[test]
    fn test_half_weight_scenario() {
        let mut mesh = two_vertex_mesh();
        mesh.add_morph_target(1, &[1], &[0.0, 1.0, 0.0]).unwrap();

        let weights: WeightSet = [(1, 0.5)].into_iter().collect();
        mesh.update(&weights);
        assert_close(mesh.positions(), &[0.0, 0.0, 0.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_update_resets_from_base() {
        let mut mesh = two_vertex_mesh();
        mesh.add_morph_target(1, &[0], &[1.0, 1.0, 1.0]).unwrap();

        let weights: WeightSet = [(1, 1.0)].into_iter().collect();
        mesh.update(&weights);
        let first = mesh.positions().to_vec();
        mesh.update(&weights);
        assert_eq!(mesh.positions(), first.as_slice());

        mesh.update(&WeightSet::new());
        assert_eq!(mesh.positions(), mesh.base_positions());
    }

    #[test]
    fn test_invalid_target_leaves_registry_unchanged() {
        let mut mesh = two_vertex_mesh();
        mesh.add_morph_target(1, &[0], &[1.0, 0.0, 0.0]).unwrap();

        let err = mesh.add_morph_target(1, &[0, 1], &[1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            MorphError::InvalidTarget {
                id: 1,
                indices: 2,
                deltas: 3
            }
        );
        assert_eq!(mesh.morph_target_count(), 1);
        assert_eq!(mesh.morph_manager().get_morph(1).unwrap().offset_count(), 1);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut mesh = two_vertex_mesh();
        let err = mesh.add_morph_target(3, &[2], &[0.0, 1.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            MorphError::IndexOutOfRange {
                id: 3,
                index: 2,
                vertex_count: 2
            }
        );

        let err = mesh.add_morph_target(3, &[-1], &[0.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(err, MorphError::IndexOutOfRange { index: -1, .. }));
        assert_eq!(mesh.morph_target_count(), 0);
    }

    #[test]
    fn test_unvalidated_indices_never_write_out_of_bounds() {
        let config = EngineConfig {
            validate_indices: false,
            ..EngineConfig::default()
        };
        let mut mesh = BlendMesh::with_config(&[0.0; 6], config).unwrap();
        mesh.add_morph_target(1, &[-4, 1, 7], &[9.0, 9.0, 9.0, 0.0, 2.0, 0.0, 9.0, 9.0, 9.0])
            .unwrap();
        assert_eq!(mesh.morph_manager().get_morph(1).unwrap().offset_count(), 2);

        let weights: WeightSet = [(1, 1.0)].into_iter().collect();
        mesh.update(&weights);
        assert_close(mesh.positions(), &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_clamped_zero_weight_equals_omission() {
        let config = EngineConfig {
            clamp_weights: true,
            ..EngineConfig::default()
        };
        let mut mesh = BlendMesh::with_config(&[0.0; 3], config).unwrap();
        mesh.add_morph_target_with_range(1, &[0], &[1.0, 0.0, 0.0], 0.5, 1.0)
            .unwrap();

        mesh.update(&[(1, 0.0)].into_iter().collect());
        let with_zero = mesh.positions().to_vec();
        mesh.update(&WeightSet::new());
        assert_eq!(with_zero, mesh.positions());

        mesh.update(&[(1, 0.1)].into_iter().collect());
        assert_close(mesh.positions(), &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_ranged_target_keeps_range() {
        let mut mesh = two_vertex_mesh();
        mesh.add_morph_target_with_range(2, &[1], &[0.0, 1.0, 0.0], -1.0, 2.0)
            .unwrap();
        let target = mesh.morph_manager().get_morph(2).unwrap();
        assert_eq!((target.min_weight, target.max_weight), (-1.0, 2.0));

        let err = mesh
            .add_morph_target_with_range(3, &[0], &[0.0], 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, MorphError::InvalidTarget { id: 3, .. }));
    }

    #[test]
    fn test_write_to_capacity_guard() {
        let mesh = two_vertex_mesh();
        assert_eq!(mesh.byte_len(), 24);

        let mut small = vec![0xAAu8; 23];
        let err = mesh.write_to(&mut small).unwrap_err();
        assert_eq!(
            err,
            MorphError::BufferTooSmall {
                required: 24,
                capacity: 23
            }
        );
        assert!(small.iter().all(|&b| b == 0xAA));

        let mut exact = vec![0u8; 24];
        assert_eq!(mesh.write_to(&mut exact).unwrap(), 24);
        assert_eq!(&exact[12..16], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn test_parallel_reset_matches_serial() {
        let base: Vec<f32> = (0..3 * 10_000).map(|i| i as f32 * 0.001).collect();
        let parallel = EngineConfig {
            parallel_threshold: 1,
            ..EngineConfig::default()
        };
        let mut a = BlendMesh::with_config(&base, parallel).unwrap();
        let mut b = BlendMesh::with_config(&base, EngineConfig::default()).unwrap();
        for mesh in [&mut a, &mut b] {
            mesh.add_morph_target(1, &[0, 9_999], &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0])
                .unwrap();
            mesh.update(&[(1, 0.75)].into_iter().collect());
        }
        assert_eq!(a.positions(), b.positions());
    }
}
