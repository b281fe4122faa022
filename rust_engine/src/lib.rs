//! CharMorph Engine - Morph 混合运行时
//!
//! 提供角色网格的实时变形：
//! - 基础形状 + 稀疏 Morph 目标的加权叠加
//! - 带代数校验的网格句柄存储，可被多个线程并发调用
//! - 重算后写入调用方提供的顶点缓冲区
//! - JNI 接口

pub mod config;
pub mod jni_bridge;
pub mod mesh;
pub mod morph;
pub mod store;

pub use config::EngineConfig;
pub use mesh::BlendMesh;
pub use morph::{MorphManager, MorphTarget, VertexMorphOffset, WeightSet};
pub use store::{MeshHandle, MeshStore, PublishOutcome};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MorphError {
    #[error("Invalid geometry: vertex buffer length {len} is not a multiple of 3")]
    InvalidGeometry { len: usize },

    #[error("Invalid morph target {id}: {deltas} delta components for {indices} indices")]
    InvalidTarget { id: i32, indices: usize, deltas: usize },

    #[error("Morph target {id} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfRange { id: i32, index: i64, vertex_count: usize },

    #[error("Output buffer too small: {capacity} < {required} bytes")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("Weight count mismatch: {ids} ids, {weights} weights")]
    WeightCountMismatch { ids: usize, weights: usize },

    #[error("Invalid mesh handle: {0:#x}")]
    InvalidHandle(i64),

    #[error("Count {count} does not fit in a 32-bit host integer")]
    CountOverflow { count: usize },
}

pub type Result<T> = std::result::Result<T, MorphError>;
