//! # 播放集成测试
//!
//! 测试 分节加载 → 编译 → 逐字播放 → 排版 的完整链路。
//! 字形度量使用测试内实现，不依赖真实字体。

use dialogue_runtime::{
    DialogueRuntime, GlyphEntry, GlyphKind, GlyphMetrics, MonospaceMetrics, NamedColor,
    PlaybackConfig, PlaybackPhase, Rect, Size,
};

/// 比例字体：`i`/`l` 较窄，`big` 字体字形加高
struct ProportionalMetrics;

impl GlyphMetrics for ProportionalMetrics {
    fn glyph_size(&self, ch: char, font: Option<&str>, scale: f32) -> Size {
        let width = match ch {
            'i' | 'l' => 4.0,
            _ => 10.0,
        };
        let height = if font == Some("big") { 30.0 } else { 20.0 };
        Size::new(width * scale, height * scale)
    }

    fn icon_size(&self, id: &str) -> Option<Size> {
        (id == "star").then(|| Size::new(16.0, 16.0))
    }

    fn has_font(&self, id: &str) -> bool {
        id == "big"
    }
}

fn test_config() -> PlaybackConfig {
    PlaybackConfig {
        window: Rect::new(0.0, 0.0, 30.0, 100.0),
        line_spacing: 4.0,
        kerning: 0.0,
        default_speed_ms: 1,
        ..PlaybackConfig::default()
    }
}

fn layout_of(glyphs: &[GlyphEntry]) -> String {
    glyphs
        .iter()
        .map(|g| {
            let label = match &g.kind {
                GlyphKind::Char(c) => c.to_string(),
                GlyphKind::Icon(id) => format!("<{id}>"),
            };
            format!("{}@{},{}", label, g.position.x, g.position.y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 播放到当前页结束
fn finish_page<M: GlyphMetrics>(runtime: &mut DialogueRuntime<M>) {
    for _ in 0..1000 {
        if !runtime.is_busy() || runtime.phase().is_waiting() {
            return;
        }
        runtime.update(10, false);
    }
    panic!("page never finished");
}

/// 测试自动换行
#[test]
fn test_wraps_at_window_edge() {
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), test_config());
    runtime.show("abcd");
    finish_page(&mut runtime);

    insta::assert_snapshot!(layout_of(runtime.glyphs()), @"a@0,0 b@10,0 c@20,0 d@0,24");
}

/// 测试关闭自动换行时字形越过右边界
#[test]
fn test_no_wrap_overflows() {
    let config = PlaybackConfig {
        wrap: false,
        ..test_config()
    };
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), config);
    runtime.show("abcd");
    finish_page(&mut runtime);

    insta::assert_snapshot!(layout_of(runtime.glyphs()), @"a@0,0 b@10,0 c@20,0 d@30,0");
}

/// 测试行高取本行最高的字形
#[test]
fn test_line_height_follows_tallest_glyph() {
    let config = PlaybackConfig {
        window: Rect::new(0.0, 0.0, 500.0, 300.0),
        ..test_config()
    };
    let mut runtime = DialogueRuntime::with_config(ProportionalMetrics, config);
    runtime.show("[size:48]A[size:24]il\nx");
    finish_page(&mut runtime);

    insta::assert_snapshot!(layout_of(runtime.glyphs()), @"A@0,0 i@20,0 l@24,0 x@0,44");
}

/// 测试字体切换和未知字体
#[test]
fn test_font_switch_affects_following_glyphs() {
    let mut runtime = DialogueRuntime::with_config(ProportionalMetrics, test_config());
    runtime.show("a[font:big]b[font:missing]c[font]d");
    finish_page(&mut runtime);

    let fonts: Vec<_> = runtime
        .glyphs()
        .iter()
        .map(|g| g.style.font.as_deref())
        .collect();
    assert_eq!(fonts, vec![None, Some("big"), Some("big"), None]);
    assert_eq!(runtime.glyphs()[1].size.height, 30.0);
}

/// 测试行内图标与未知图标
#[test]
fn test_icons() {
    let config = PlaybackConfig {
        default_speed_ms: 100,
        window: Rect::new(0.0, 0.0, 500.0, 300.0),
        ..test_config()
    };
    let mut runtime = DialogueRuntime::with_config(ProportionalMetrics, config);
    runtime.show("[icon:nope]a[icon:star]b");

    // 未知图标同样占用一个输出间隔
    runtime.update(100, false);
    assert!(runtime.glyphs().is_empty());
    runtime.update(100, false);
    assert_eq!(runtime.glyphs().len(), 1);

    runtime.update(200, false);
    insta::assert_snapshot!(layout_of(runtime.glyphs()), @"a@0,0 <star>@10,0 b@26,0");
}

/// 测试多分节文件的完整播放
#[test]
fn test_section_playthrough() {
    let source = "\
; 对话文件
#Intro
Hello[next]
#Shop
[color:gold]Welcome![next]
[event:open_shop]Take a look.
#Outro
Bye[end]";

    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(8.0, 16.0), PlaybackConfig::default());
    runtime.show_section(source, Some("Shop")).unwrap();

    finish_page(&mut runtime);
    assert_eq!(runtime.page_text(), "Welcome!");
    assert!(runtime.glyphs().iter().all(|g| g.style.color == NamedColor::Gold));
    assert_eq!(runtime.get_event(), None);

    runtime.next();
    finish_page(&mut runtime);
    assert_eq!(runtime.page_text(), "Take a look.");
    assert_eq!(runtime.get_event().as_deref(), Some("open_shop"));
    // 样式跨页保留
    assert_eq!(runtime.style().color, NamedColor::Gold);

    runtime.next();
    assert_eq!(runtime.phase(), PlaybackPhase::Idle);
    assert_eq!(runtime.history().pages(), vec!["Welcome!", "Take a look."]);
}

/// 测试翻页后字形清空、光标回到原点
#[test]
fn test_pagination_resets_page() {
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), test_config());
    runtime.show("ab\ncd[next]ef");
    finish_page(&mut runtime);
    assert_eq!(runtime.glyphs().len(), 4);

    runtime.update(0, true);
    assert!(runtime.glyphs().is_empty());
    assert_eq!(runtime.cursor().x, 0.0);
    assert_eq!(runtime.cursor().y, 0.0);
}

/// 测试跳过会忽略暂停，并停在页尾
#[test]
fn test_skip_ignores_waits() {
    let config = PlaybackConfig {
        default_speed_ms: 500,
        ..PlaybackConfig::default()
    };
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(8.0, 16.0), config);
    runtime.show("slow[wait:9999] text[next]page two");

    runtime.update(0, true);
    assert_eq!(runtime.page_text(), "slow text");
    assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
    assert_eq!(runtime.state().pause_ms, 0);
}

/// 测试重置标签恢复全部默认样式
#[test]
fn test_reset_restores_defaults() {
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), test_config());
    runtime.show("[color:red][size:48][rotate:15][shake:2]a[reset]b");
    finish_page(&mut runtime);

    let glyphs = runtime.glyphs();
    assert_eq!(glyphs[0].style.color, NamedColor::Red);
    assert_eq!(glyphs[0].style.rotation, 15.0);
    assert!(glyphs[0].style.shake.is_active());

    assert_eq!(glyphs[1].style.color, NamedColor::White);
    assert_eq!(glyphs[1].style.scale, 1.0);
    assert_eq!(glyphs[1].style.rotation, 0.0);
    assert!(!glyphs[1].style.shake.is_active());
}

/// 测试抖动偏移只由时钟决定
#[test]
fn test_shake_offset_is_deterministic() {
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), test_config());
    runtime.show("[shake:3,5]ab");
    finish_page(&mut runtime);

    let glyph = &runtime.glyphs()[0];
    let clock = runtime.clock_ms();
    assert_eq!(glyph.shake_offset(clock, 0), glyph.shake_offset(clock, 0));

    let (dx, dy) = glyph.shake_offset(clock, 0);
    assert!(dx.abs() <= 3.0);
    assert!(dy.abs() <= 5.0);
}

/// 测试配置文件驱动的播放
#[test]
fn test_json_config_drives_playback() {
    let config = PlaybackConfig::from_json_str(
        r#"{ "default_speed_ms": 50, "window": { "x": 5, "y": 7, "width": 200, "height": 50 } }"#,
    )
    .unwrap();
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), config);
    runtime.show("xyz");

    runtime.update(120, false);
    assert_eq!(runtime.page_text(), "xy");
    assert_eq!(runtime.glyphs()[0].position.x, 5.0);
    assert_eq!(runtime.glyphs()[0].position.y, 7.0);
}

/// 测试重新 show 会丢弃上一段的事件和页面
#[test]
fn test_show_replaces_previous_dialogue() {
    let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), test_config());
    runtime.show("[event:old]first");
    finish_page(&mut runtime);

    runtime.show("second");
    assert!(runtime.glyphs().is_empty());
    assert_eq!(runtime.get_event(), None);
    assert_eq!(runtime.phase(), PlaybackPhase::Playing);
    assert_eq!(runtime.clock_ms(), 0);
}
