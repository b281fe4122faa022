//! 多线程调用测试

use std::thread;

use charmorph_engine::store;

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// 每个线程看到的输出都是某一次完整重算的结果，不会混入其他线程的权重
#[test]
fn test_concurrent_updates_never_tear() {
    const VERTICES: usize = 2048;
    let mesh = store::create_mesh(&vec![0.0; VERTICES * 3]).unwrap();
    let indices: Vec<i32> = (0..VERTICES as i32).collect();
    let deltas: Vec<f32> = (0..VERTICES).flat_map(|_| [1.0, 1.0, 1.0]).collect();
    store::add_morph_target(mesh, 1, &indices, &deltas).unwrap();

    thread::scope(|s| {
        for t in 0..4 {
            s.spawn(move || {
                let weight = (t + 1) as f32;
                let mut output = vec![0u8; VERTICES * 12];
                for _ in 0..50 {
                    store::update_morphs(mesh, &[1], &[weight], &mut output).unwrap();
                    assert!(floats(&output).iter().all(|&v| v == weight));
                }
            });
        }
        s.spawn(move || {
            for id in 100..150 {
                store::add_morph_target(mesh, id, &[0], &[0.0, 0.0, 0.0]).unwrap();
            }
        });
    });

    assert_eq!(store::morph_target_count(mesh).unwrap(), 51);
    store::destroy_mesh(mesh).unwrap();
}

#[test]
fn test_independent_meshes_in_parallel() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mesh = store::create_mesh(&[i as f32, 0.0, 0.0]).unwrap();
            store::add_morph_target(mesh, 0, &[0], &[0.0, 1.0, 0.0]).unwrap();
            mesh
        })
        .collect();

    thread::scope(|s| {
        for (i, &mesh) in handles.iter().enumerate() {
            s.spawn(move || {
                let mut output = vec![0u8; 12];
                store::update_morphs(mesh, &[0], &[i as f32], &mut output).unwrap();
                assert_eq!(floats(&output), vec![i as f32, i as f32, 0.0]);
            });
        }
    });

    for mesh in handles {
        store::destroy_mesh(mesh).unwrap();
    }
}
