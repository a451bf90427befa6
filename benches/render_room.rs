use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minitrace::{
    Camera, FrameRenderer, RenderSettings, Scene, SceneSettings,
    geometry::ScreenSize,
    renderer::DiagnosticsSettings,
    scene::{QueryMode, demo},
};

fn settings() -> RenderSettings {
    RenderSettings::builder()
        .diagnostics(DiagnosticsSettings {
            frame_time: false,
            intersection_stats: false,
        })
        .build()
}

fn criterion_benchmark(c: &mut Criterion) {
    let camera = Camera::room_view(ScreenSize::new(400, 400));

    let mut group = c.benchmark_group("render_room");
    for (name, query_mode) in [("linear", QueryMode::Linear), ("bvh", QueryMode::Bvh)] {
        let scene = Scene::new(
            demo::room(None),
            SceneSettings::builder().query_mode(query_mode).build(),
        );
        let mut renderer = FrameRenderer::new(scene, settings()).unwrap();
        group.bench_function(name, |b| b.iter(|| renderer.render_frame(&camera).unwrap()));
    }
    group.finish();

    let mut group = c.benchmark_group("render_cluster");
    for count in [16, 64, 256] {
        for (name, query_mode) in [("linear", QueryMode::Linear), ("bvh", QueryMode::Bvh)] {
            let scene = Scene::new(
                demo::sphere_cluster(count, 42),
                SceneSettings::builder().query_mode(query_mode).build(),
            );
            let camera = Camera::builder()
                .center([0.0, 0.0, 40.0].into())
                .forward([0.0, 0.0, -1.0].into())
                .up([0.0, 1.0, 0.0].into())
                .resolution(ScreenSize::new(200, 200))
                .view_width(20.0)
                .view_distance(25.0)
                .build();
            let mut renderer = FrameRenderer::new(scene, settings()).unwrap();
            group.bench_with_input(BenchmarkId::new(name, count), &camera, |b, camera| {
                b.iter(|| renderer.render_frame(camera).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = criterion_benchmark
}
criterion_main!(benches);
