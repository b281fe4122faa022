//! 引擎配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。
//! 网格在创建时拷贝一份当前配置，之后修改全局配置不影响已存在的网格。

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    // ========== 校验 ==========
    /// 注册 Morph 时是否检查顶点索引越界，默认 true
    /// 关闭后负索引在注册时丢弃，越界索引在混合时跳过
    pub validate_indices: bool,

    // ========== 权重 ==========
    /// 是否把权重限制在 Morph 自身的 [min_weight, max_weight] 范围内，默认 false
    pub clamp_weights: bool,

    // ========== 性能 ==========
    /// 顶点数达到此值时使用 rayon 并行重置顶点缓冲区，默认 65536
    pub parallel_threshold: usize,

    // ========== 调试 ==========
    /// 是否输出每帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_indices: true,

            clamp_weights: false,

            // 小网格直接 copy_from_slice 更快，线程调度反而是开销
            parallel_threshold: 65_536,

            debug_log: false,
        }
    }
}

/// 全局配置实例
static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> =
    Lazy::new(|| RwLock::new(EngineConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> EngineConfig {
    ENGINE_CONFIG.read().clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: EngineConfig) {
    *ENGINE_CONFIG.write() = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *ENGINE_CONFIG.write() = EngineConfig::default();
}
