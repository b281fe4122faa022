//! 网格句柄

use slotmap::{new_key_type, Key, KeyData};

new_key_type! {
    /// 网格存储内部键（索引 + 代数）
    pub struct MeshKey;
}

/// 跨边界传递的网格句柄
///
/// 原始值是 slotmap 键的 FFI 表示，永远不为 0；销毁后槽位被复用时代数不同，
/// 旧句柄不会命中新网格。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(MeshKey);

impl MeshHandle {
    pub(crate) fn new(key: MeshKey) -> Self {
        Self(key)
    }

    pub(crate) fn key(self) -> MeshKey {
        self.0
    }

    /// 转为 jlong 等宿主整数句柄
    pub fn to_raw(self) -> i64 {
        self.0.data().as_ffi() as i64
    }

    /// 由宿主整数句柄还原，0 视为空句柄
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw == 0 {
            return None;
        }
        Some(Self(KeyData::from_ffi(raw as u64).into()))
    }
}
