//! dk_probe - 显示环境探测工具
//!
//! 用法: `dk_probe [config.json]`

use std::path::PathBuf;

use anyhow::Context;
use dk_display::{DisplayConfig, bridge, registry};
use dk_gfx::{Color, Font};
use tracing_subscriber::EnvFilter;

const SAMPLE_TEXT: &str = "The quick brown fox";
const PROPERTY_NAMES: &[&str] = &["GWL_STYLE", "GWL_EXSTYLE", "GWLP_USERDATA", "WS_VISIBLE"];

fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => DisplayConfig::try_load_from(&path)?,
        None => DisplayConfig::load(),
    };

    // RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let display = registry::current().context("opening display")?;
    let main = registry::main()?;
    println!(
        "display #{} on {} (main: {})",
        display.id().raw(),
        display.platform(),
        main.is_current_thread()
    );

    // 显示器
    let primary = display.primary_monitor()?;
    for monitor in display.monitors()?.iter() {
        let marker = if monitor.id == primary.id { " *" } else { "" };
        println!(
            "monitor {}: {:?} work {:?}{marker}",
            monitor.id, monitor.bounds, monitor.work_area
        );
    }

    // 字体度量
    for font in [
        Font::new("Arial", 9),
        Font::new("Arial", 12),
        Font::new("Arial", 12).with_bold(),
    ] {
        let (w, h) = display.text_extent(&font, SAMPLE_TEXT)?;
        println!("{font}: {w}x{h}");
    }
    display.resolve_color(&Color::BLACK)?;
    display.resolve_color(&Color::WHITE)?;

    // 窗口属性常量
    let bridge = bridge();
    for name in PROPERTY_NAMES {
        println!("{} {name} = {}", bridge.platform(), bridge.os_constant(name));
    }

    run_event_loop(&display)?;

    let stats = display.cache_stats();
    println!("cache: {}", stats.total());
    display.teardown();
    registry().detach_current();
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_event_loop(display: &dk_display::Display<dk_display::DefaultBackend>) -> anyhow::Result<()> {
    use dk_display::EventPump;

    // headless: 根窗口在一次空闲等待后由另一线程销毁
    let root = display.backend().create_window();
    let proxy = display.backend().proxy();
    let worker = std::thread::spawn(move || {
        proxy.post(|| {
            tracing::info!("probe event dispatched");
            Ok(())
        });
        proxy.destroy_window(root);
    });

    let mut pump = EventPump::new(display);
    let stats = pump.run_nested(root);
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("probe worker panicked"))?;
    println!(
        "event loop: dispatched={} idle={} failures={}",
        stats.dispatched, stats.idle, stats.failures
    );
    Ok(())
}

#[cfg(target_os = "windows")]
fn run_event_loop(display: &dk_display::Display<dk_display::DefaultBackend>) -> anyhow::Result<()> {
    // 没有顶层窗口，只处理当前队列中的消息
    let mut pump = dk_display::EventPump::new(display);
    while pump.tick() == dk_display::Tick::Dispatched {}
    println!("event loop: {:?}", pump.stats());
    Ok(())
}
