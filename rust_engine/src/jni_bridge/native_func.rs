//! JNI 原生函数实现
//!
//! 对应 com.charmorph.nativebridge.NativeLib
//! 使用标准 jni 0.21 API

use jni::objects::{JByteBuffer, JFloatArray, JIntArray, JObject};
use jni::sys::{jboolean, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::ptr;

use crate::store::{self, MeshHandle};
use crate::MorphError;

use super::{count_to_jint, read_float_array, read_int_array, throw_error};

const VERSION: &str = concat!("CharMorph Engine ", env!("CARGO_PKG_VERSION"));

/// 解析句柄，空句柄抛出 IllegalStateException
fn resolve_handle(env: &mut JNIEnv, raw: jlong) -> Option<MeshHandle> {
    let handle = MeshHandle::from_raw(raw);
    if handle.is_none() {
        throw_error(env, &MorphError::InvalidHandle(raw));
    }
    handle
}

/// 读取 Morph 的索引与偏移数组
fn read_target_arrays(
    env: &JNIEnv,
    indices: &JIntArray,
    deltas: &JFloatArray,
) -> Option<(Vec<i32>, Vec<f32>)> {
    let indices = match read_int_array(env, indices) {
        Ok(v) => v,
        Err(e) => {
            log::error!("读取 Morph 索引数组失败: {}", e);
            return None;
        }
    };
    let deltas = match read_float_array(env, deltas) {
        Ok(v) => v,
        Err(e) => {
            log::error!("读取 Morph 偏移数组失败: {}", e);
            return None;
        }
    };
    Some((indices, deltas))
}

// ============================================================================
// 基础函数
// ============================================================================

/// 获取版本号
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_stringFromJNI(
    env: JNIEnv,
    _this: JObject,
) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// 网格生命周期
// ============================================================================

/// 创建网格，失败返回 0
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_createMesh(
    mut env: JNIEnv,
    _this: JObject,
    vertices: JFloatArray,
) -> jlong {
    let base = match read_float_array(&env, &vertices) {
        Ok(v) => v,
        Err(e) => {
            log::error!("读取顶点数组失败: {}", e);
            return 0;
        }
    };

    match store::create_mesh(&base) {
        Ok(handle) => handle.to_raw(),
        Err(e) => {
            throw_error(&mut env, &e);
            0
        }
    }
}

/// 销毁网格
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_destroyMesh(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
) {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return;
    };
    if let Err(e) = store::destroy_mesh(handle) {
        throw_error(&mut env, &e);
    }
}

// ============================================================================
// Morph 注册
// ============================================================================

/// 注册或替换 Morph
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_addMorphTarget(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
    id: jint,
    indices: JIntArray,
    deltas: JFloatArray,
) {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return;
    };

    let Some((indices, deltas)) = read_target_arrays(&env, &indices, &deltas) else {
        return;
    };

    if let Err(e) = store::add_morph_target(handle, id, &indices, &deltas) {
        throw_error(&mut env, &e);
    }
}

/// 注册或替换带权重范围的 Morph
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_addMorphTargetWithRange(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
    id: jint,
    indices: JIntArray,
    deltas: JFloatArray,
    min_weight: jfloat,
    max_weight: jfloat,
) {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return;
    };
    let Some((indices, deltas)) = read_target_arrays(&env, &indices, &deltas) else {
        return;
    };

    if let Err(e) =
        store::add_morph_target_with_range(handle, id, &indices, &deltas, min_weight, max_weight)
    {
        throw_error(&mut env, &e);
    }
}

/// 移除 Morph
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_removeMorphTarget(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
    id: jint,
) -> jboolean {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return JNI_FALSE;
    };
    match store::remove_morph_target(handle, id) {
        Ok(true) => JNI_TRUE,
        Ok(false) => JNI_FALSE,
        Err(e) => {
            throw_error(&mut env, &e);
            JNI_FALSE
        }
    }
}

// ============================================================================
// 更新与输出
// ============================================================================

/// 按权重重算顶点并写入 direct ByteBuffer
///
/// 缓冲区容量不足时不写入，只记录警告。
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_updateMorphs(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
    ids: JIntArray,
    weights: JFloatArray,
    output: JByteBuffer,
) {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return;
    };

    let ids = match read_int_array(&env, &ids) {
        Ok(v) => v,
        Err(e) => {
            log::error!("读取 Morph id 数组失败: {}", e);
            return;
        }
    };
    let weights = match read_float_array(&env, &weights) {
        Ok(v) => v,
        Err(e) => {
            log::error!("读取 Morph 权重数组失败: {}", e);
            return;
        }
    };

    let dst = match env.get_direct_buffer_address(&output) {
        Ok(dst) if !dst.is_null() => dst,
        Ok(_) | Err(_) => {
            log::error!("输出缓冲区不是 direct ByteBuffer");
            return;
        }
    };
    let capacity = match env.get_direct_buffer_capacity(&output) {
        Ok(capacity) => capacity,
        Err(e) => {
            log::error!("获取输出缓冲区容量失败: {}", e);
            return;
        }
    };

    // SAFETY: direct buffer 由调用方持有，在本次调用期间有效且至少 capacity 字节
    let output = unsafe { std::slice::from_raw_parts_mut(dst, capacity) };

    if let Err(e) = store::update_morphs(handle, &ids, &weights, output) {
        throw_error(&mut env, &e);
    }
}

// ============================================================================
// 查询
// ============================================================================

/// 获取顶点数量
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_getVertexCount(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
) -> jint {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return 0;
    };
    match store::vertex_count(handle).and_then(count_to_jint) {
        Ok(count) => count,
        Err(e) => {
            throw_error(&mut env, &e);
            0
        }
    }
}

/// 获取 Morph 数量
#[no_mangle]
pub extern "system" fn Java_com_charmorph_nativebridge_NativeLib_getMorphTargetCount(
    mut env: JNIEnv,
    _this: JObject,
    mesh: jlong,
) -> jint {
    let Some(handle) = resolve_handle(&mut env, mesh) else {
        return 0;
    };
    match store::morph_target_count(handle).and_then(count_to_jint) {
        Ok(count) => count,
        Err(e) => {
            throw_error(&mut env, &e);
            0
        }
    }
}
