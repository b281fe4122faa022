//! JNI 绑定层 - 与 Kotlin 代码交互
//!
//! 只负责数组/缓冲区的转换和错误上报，逻辑都在 `store` 中。

mod native_func;

pub use native_func::*;

use jni::errors::Result as JniResult;
use jni::objects::{JFloatArray, JIntArray};
use jni::sys::jint;
use jni::JNIEnv;

use crate::{MorphError, Result};

/// 拷贝 Java float[]
pub(crate) fn read_float_array(env: &JNIEnv, array: &JFloatArray) -> JniResult<Vec<f32>> {
    let len = env.get_array_length(array)? as usize;
    let mut buf = vec![0.0f32; len];
    env.get_float_array_region(array, 0, &mut buf)?;
    Ok(buf)
}

/// 拷贝 Java int[]
pub(crate) fn read_int_array(env: &JNIEnv, array: &JIntArray) -> JniResult<Vec<i32>> {
    let len = env.get_array_length(array)? as usize;
    let mut buf = vec![0i32; len];
    env.get_int_array_region(array, 0, &mut buf)?;
    Ok(buf)
}

/// 数量转为 jint，超出 i32 范围时报错
pub(crate) fn count_to_jint(count: usize) -> Result<jint> {
    jint::try_from(count).map_err(|_| MorphError::CountOverflow { count })
}

/// 错误对应的 Java 异常类
fn exception_class(err: &MorphError) -> &'static str {
    match err {
        MorphError::InvalidHandle(_) => "java/lang/IllegalStateException",
        MorphError::CountOverflow { .. } => "java/lang/ArithmeticException",
        _ => "java/lang/IllegalArgumentException",
    }
}

/// 记录错误并在 Java 侧抛出异常
pub(crate) fn throw_error(env: &mut JNIEnv, err: &MorphError) {
    log::error!("{}", err);
    if let Err(e) = env.throw_new(exception_class(err), err.to_string()) {
        log::error!("抛出 Java 异常失败: {}", e);
    }
}
