//! 网格存储
//!
//! 所有网格放在一个带代数校验的 slotmap 中，外部只持有 `MeshHandle`。
//! 每个网格有自己的互斥锁，不同网格之间可以完全并发。

mod handle;
mod ops;

pub use handle::{MeshHandle, MeshKey};
pub use ops::*;

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;

use crate::mesh::BlendMesh;

/// 共享网格
pub type SharedMesh = Arc<Mutex<BlendMesh>>;

/// 全局网格存储
pub static MESHES: Lazy<RwLock<MeshStore>> = Lazy::new(|| RwLock::new(MeshStore::new()));

/// 网格存储
#[derive(Default)]
pub struct MeshStore {
    meshes: SlotMap<MeshKey, SharedMesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self {
            meshes: SlotMap::with_key(),
        }
    }

    /// 注册网格并返回句柄
    pub fn insert(&mut self, mesh: BlendMesh) -> MeshHandle {
        MeshHandle::new(self.meshes.insert(Arc::new(Mutex::new(mesh))))
    }

    /// 移除网格，句柄失效
    pub fn remove(&mut self, handle: MeshHandle) -> Option<SharedMesh> {
        self.meshes.remove(handle.key())
    }

    /// 获取网格
    pub fn get(&self, handle: MeshHandle) -> Option<SharedMesh> {
        self.meshes.get(handle.key()).cloned()
    }

    pub fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(handle.key())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
