//! 可变形网格

mod runtime;

pub use runtime::BlendMesh;

/// 每个顶点的分量数（x, y, z）
pub const COMPONENTS_PER_VERTEX: usize = 3;

/// 每个顶点在输出缓冲区中占用的字节数
pub const BYTES_PER_VERTEX: usize = COMPONENTS_PER_VERTEX * std::mem::size_of::<f32>();
