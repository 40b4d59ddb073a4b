//! Dialogue Engine - Host (终端前端)
//!
//! 在终端中播放对话脚本：按页输出文本和事件，回车推进。
//! 使用等宽度量排版，模拟时钟按固定帧长推进。

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use dialogue_runtime::{DialogueRuntime, MonospaceMetrics, PlaybackPhase, labels};

#[derive(Parser, Debug)]
#[command(name = "dialogue", about = "在终端中播放对话脚本")]
struct Cli {
    /// 脚本文件
    script: PathBuf,

    /// 要播放的分节标签（不指定则播放整个文件）
    #[arg(short, long)]
    label: Option<String>,

    /// 列出文件中的分节标签后退出
    #[arg(long)]
    list_labels: bool,

    /// 播放配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 每帧的模拟毫秒数（至少 1）
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    tick_ms: u32,

    /// 每页结束后自动推进，不等待回车
    #[arg(short, long)]
    auto_advance: bool,

    /// 按真实时间播放（每帧休眠）
    #[arg(long)]
    realtime: bool,

    /// 以 JSON Lines 输出页面
    #[arg(long)]
    json: bool,

    /// 单元格宽度（像素）
    #[arg(long, default_value_t = 16.0)]
    cell_width: f32,

    /// 单元格高度（像素）
    #[arg(long, default_value_t = 24.0)]
    cell_height: f32,

    /// 模拟时间上限（毫秒），超过后中止
    #[arg(long, default_value_t = 600_000)]
    max_ms: u64,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 一页输出
#[derive(Debug, Serialize)]
struct PageRecord {
    page: usize,
    text: String,
    events: Vec<String>,
    clock_ms: u64,
    ended: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let source = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("无法读取脚本: {}", cli.script.display()))?;

    if cli.list_labels {
        for label in labels(&source) {
            println!("{label}");
        }
        return Ok(());
    }

    let metrics = MonospaceMetrics::new(cli.cell_width, cli.cell_height);
    let mut runtime = create_runtime(metrics, cli.config.as_ref())?;

    info!(script = %cli.script.display(), label = ?cli.label, "加载脚本");
    let load_result = runtime.show_section(&source, cli.label.as_deref());
    for issue in runtime.issues() {
        warn!("{issue}");
    }

    play(&mut runtime, &cli)?;

    load_result.with_context(|| format!("分节加载失败: {}", cli.script.display()))?;
    Ok(())
}

fn create_runtime(metrics: MonospaceMetrics, config: Option<&PathBuf>) -> Result<DialogueRuntime> {
    let Some(path) = config else {
        return Ok(DialogueRuntime::new(metrics));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取配置: {}", path.display()))?;
    let runtime = DialogueRuntime::with_config_json(metrics, &json)
        .with_context(|| format!("配置无效: {}", path.display()))?;
    debug!(config = ?runtime.config(), "已加载配置");
    Ok(runtime)
}

/// 主循环
fn play(runtime: &mut DialogueRuntime, cli: &Cli) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut page = 0;
    let mut events = Vec::new();
    let mut shown = false;

    while runtime.is_busy() {
        runtime.update(cli.tick_ms, false);
        while let Some(event) = runtime.get_event() {
            events.push(event);
        }

        let phase = runtime.phase();
        if !phase.is_waiting() {
            shown = false;
        } else if !shown {
            page += 1;
            shown = true;
            emit_page(
                cli.json,
                PageRecord {
                    page,
                    text: runtime.page_text().to_string(),
                    events: std::mem::take(&mut events),
                    clock_ms: runtime.clock_ms(),
                    ended: runtime.is_script_ended(),
                },
            )?;
        }

        if phase == PlaybackPhase::Waiting {
            if !cli.auto_advance {
                wait_for_enter(&mut input)?;
            }
            runtime.next();
            shown = false;
        }

        if runtime.clock_ms() > cli.max_ms {
            anyhow::bail!("播放超过 {} ms，已中止", cli.max_ms);
        }
        if cli.realtime {
            std::thread::sleep(Duration::from_millis(u64::from(cli.tick_ms)));
        }
    }

    // 关闭后才到达的事件
    while let Some(event) = runtime.get_event() {
        events.push(event);
    }
    for event in events {
        print_event(cli.json, &event)?;
    }

    info!(pages = page, history = runtime.history().len(), "播放结束");
    Ok(())
}

fn emit_page(json: bool, record: PageRecord) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
        return Ok(());
    }
    for event in &record.events {
        writeln!(out, "[event] {event}")?;
    }
    writeln!(out, "── {} ──", record.page)?;
    writeln!(out, "{}", record.text)?;
    if record.ended {
        writeln!(out, "[end]")?;
    }
    out.flush()?;
    Ok(())
}

fn print_event(json: bool, event: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "event": event }));
    } else {
        println!("[event] {event}");
    }
    Ok(())
}

fn wait_for_enter(input: &mut impl BufRead) -> Result<()> {
    let mut line = String::new();
    input.read_line(&mut line).context("读取输入失败")?;
    Ok(())
}
