//! 资源缓存性能基准测试
//!
//! 在 headless 后端上测试颜色/字体缓存命中与未命中的开销。
//! 运行: `cargo bench --bench cache_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dk_display::{Color, Display, Font, ResourceCache};
use dk_platform::headless::HeadlessDisplay;

/// 测试命中路径
fn bench_cache_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("Display hits");
    let display = Display::new(HeadlessDisplay::default());
    let red = Color::rgb(255, 0, 0);
    let arial = Font::new("Arial", 12);
    display.resolve_color(&red).unwrap();
    display.resolve_font(&arial).unwrap();

    group.bench_function("resolve_color", |b| {
        b.iter(|| black_box(display.resolve_color(black_box(&red)).unwrap()));
    });

    group.bench_function("resolve_font", |b| {
        b.iter(|| black_box(display.resolve_font(black_box(&arial)).unwrap()));
    });

    group.bench_function("text_extent", |b| {
        b.iter(|| black_box(display.text_extent(&arial, black_box("Hello, world")).unwrap()));
    });

    group.finish();
}

/// 测试未命中路径（创建 + 释放）
fn bench_cache_misses(c: &mut Criterion) {
    let mut group = c.benchmark_group("Display misses");

    for count in [16u32, 256] {
        group.bench_with_input(BenchmarkId::new("colors", count), &count, |b, &count| {
            let display = Display::new(HeadlessDisplay::default());
            b.iter(|| {
                for i in 0..count {
                    display.resolve_color(&Color::from_argb(0xFF00_0000 | i)).unwrap();
                }
                black_box(display.release_all_colors())
            });
        });
    }

    group.finish();
}

/// 测试裸缓存
fn bench_resource_cache(c: &mut Criterion) {
    let mut cache: ResourceCache<u32, u64> = ResourceCache::new();
    for key in 0..1024 {
        cache.resolve_with(&key, || Ok::<_, ()>(key as u64)).unwrap();
    }

    c.bench_function("ResourceCache hit", |b| {
        b.iter(|| black_box(cache.resolve_with(black_box(&512), || Ok::<_, ()>(0)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_cache_hits,
    bench_cache_misses,
    bench_resource_cache
);
criterion_main!(benches);
