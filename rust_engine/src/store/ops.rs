//! 基于句柄的网格操作
//!
//! 句柄在销毁后使用会返回 `InvalidHandle`，不会访问已释放的内存。

use crate::config::EngineConfig;
use crate::mesh::BlendMesh;
use crate::morph::WeightSet;
use crate::{MorphError, Result};

use super::{MeshHandle, MESHES};

/// 发布结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// 已写入输出缓冲区
    Written { bytes: usize },
    /// 输出缓冲区容量不足，未写入；顶点仍已正确重算
    BufferTooSmall { required: usize, capacity: usize },
}

impl PublishOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, PublishOutcome::Written { .. })
    }
}

/// 取出网格后在其锁内执行 `f`
///
/// 全局存储的读锁只在克隆 Arc 时持有。
fn with_mesh<R>(handle: MeshHandle, f: impl FnOnce(&mut BlendMesh) -> R) -> Result<R> {
    let mesh = MESHES
        .read()
        .get(handle)
        .ok_or(MorphError::InvalidHandle(handle.to_raw()))?;
    let mut mesh = mesh.lock();
    Ok(f(&mut mesh))
}

/// 创建网格（使用当前全局配置）
pub fn create_mesh(base_vertices: &[f32]) -> Result<MeshHandle> {
    register(BlendMesh::new(base_vertices)?)
}

/// 使用指定配置创建网格
pub fn create_mesh_with_config(base_vertices: &[f32], config: EngineConfig) -> Result<MeshHandle> {
    register(BlendMesh::with_config(base_vertices, config)?)
}

fn register(mesh: BlendMesh) -> Result<MeshHandle> {
    let vertex_count = mesh.vertex_count();
    let handle = MESHES.write().insert(mesh);
    log::info!("创建网格 {:#x}: {} 个顶点", handle.to_raw(), vertex_count);
    Ok(handle)
}

/// 销毁网格，释放顶点缓冲区和所有 Morph
///
/// 重复销毁返回 `InvalidHandle`。
pub fn destroy_mesh(handle: MeshHandle) -> Result<()> {
    // 其他线程可能仍持有 Arc，最后一个引用释放时内存才回收
    MESHES
        .write()
        .remove(handle)
        .ok_or(MorphError::InvalidHandle(handle.to_raw()))?;
    log::info!("销毁网格 {:#x}", handle.to_raw());
    Ok(())
}

/// 注册或替换 Morph
pub fn add_morph_target(handle: MeshHandle, id: i32, indices: &[i32], deltas: &[f32]) -> Result<()> {
    with_mesh(handle, |mesh| mesh.add_morph_target(id, indices, deltas))?
}

/// 注册或替换带权重范围的 Morph
pub fn add_morph_target_with_range(
    handle: MeshHandle,
    id: i32,
    indices: &[i32],
    deltas: &[f32],
    min_weight: f32,
    max_weight: f32,
) -> Result<()> {
    with_mesh(handle, |mesh| {
        mesh.add_morph_target_with_range(id, indices, deltas, min_weight, max_weight)
    })?
}

/// 移除 Morph，返回是否存在
pub fn remove_morph_target(handle: MeshHandle, id: i32) -> Result<bool> {
    with_mesh(handle, |mesh| mesh.remove_morph_target(id))
}

/// 清空所有 Morph
pub fn clear_morph_targets(handle: MeshHandle) -> Result<()> {
    with_mesh(handle, |mesh| mesh.clear_morph_targets())
}

/// 按权重重算顶点（不输出）
pub fn update(handle: MeshHandle, weights: &WeightSet) -> Result<()> {
    with_mesh(handle, |mesh| mesh.update(weights))
}

/// 按权重重算顶点并写入调用方的输出缓冲区
///
/// `ids` 与 `weights` 按位置配对，重复 id 以后者为准。
/// 重算与拷贝在同一次加锁内完成，其他线程不会看到写了一半的顶点。
pub fn update_morphs(
    handle: MeshHandle,
    ids: &[i32],
    weights: &[f32],
    output: &mut [u8],
) -> Result<PublishOutcome> {
    let weights = WeightSet::from_pairs(ids, weights)?;

    with_mesh(handle, |mesh| {
        mesh.update(&weights);
        match mesh.write_to(output) {
            Ok(bytes) => Ok(PublishOutcome::Written { bytes }),
            Err(MorphError::BufferTooSmall { required, capacity }) => {
                log::warn!("顶点输出缓冲区容量不足: {} < {}", capacity, required);
                Ok(PublishOutcome::BufferTooSmall { required, capacity })
            }
            Err(e) => Err(e),
        }
    })?
}

/// 获取顶点数量
pub fn vertex_count(handle: MeshHandle) -> Result<usize> {
    with_mesh(handle, |mesh| mesh.vertex_count())
}

/// 获取 Morph 数量
pub fn morph_target_count(handle: MeshHandle) -> Result<usize> {
    with_mesh(handle, |mesh| mesh.morph_target_count())
}

/// 拷贝当前顶点位置
pub fn read_positions(handle: MeshHandle) -> Result<Vec<f32>> {
    with_mesh(handle, |mesh| mesh.positions().to_vec())
}

/// 存活网格数量
pub fn mesh_count() -> usize {
    MESHES.read().len()
}
