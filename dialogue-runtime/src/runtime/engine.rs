//! # Engine 模块
//!
//! 对话播放引擎。
//!
//! ## 执行模型
//!
//! ```text
//! update(elapsed_ms, advance)
//! ```
//!
//! 1. 推进模拟时钟
//! 2. 计时等待中：倒计时，归零时自动推进，本帧结束
//! 3. 收到推进信号（且允许输入）时推进：翻页、关闭或跳过
//! 4. `Wait` 暂停中：倒计时，未结束则本帧结束
//! 5. 输出中：累积逐字计时器并排空指令，直到时间不够或遇到阻塞点
//!
//! 引擎本身不做任何 IO，字形尺寸通过 [`GlyphMetrics`] 查询，
//! 渲染层从 [`DialogueRuntime::glyphs`] 读取字形快照绘制。

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::command::Command;
use crate::config::PlaybackConfig;
use crate::error::{DialogueResult, LoadError, TagIssue};
use crate::history::History;
use crate::layout::{Cursor, GlyphEntry, GlyphMetrics, MonospaceMetrics};
use crate::runtime::executor::{Executor, Flow, Page};
use crate::script::{Parser, Script, error_page, extract_section};
use crate::state::{PlaybackPhase, PlaybackState, StyleState};

/// 对话播放引擎
///
/// # 使用示例
///
/// ```ignore
/// let mut runtime = DialogueRuntime::new(MonospaceMetrics::new(16.0, 24.0));
/// runtime.show("Hello[wait:200] world[next]");
///
/// loop {
///     runtime.update(frame_ms, clicked);
///     while let Some(event) = runtime.get_event() {
///         // 宿主处理事件...
///     }
///     // 绘制 runtime.glyphs()...
/// }
/// ```
pub struct DialogueRuntime<M = MonospaceMetrics> {
    config: PlaybackConfig,
    metrics: M,
    parser: Parser,
    /// 当前脚本
    script: Script,
    /// 控制状态
    state: PlaybackState,
    /// 当前样式
    style: StyleState,
    /// 当前页输出
    page: Page,
    /// 待宿主取走的事件
    events: VecDeque<String>,
    history: History,
    /// 模拟时钟（毫秒），只由 `update` 推进
    clock_ms: u64,
}

impl<M: GlyphMetrics> DialogueRuntime<M> {
    /// 以默认配置创建
    pub fn new(metrics: M) -> Self {
        Self::with_config(metrics, PlaybackConfig::default())
    }

    /// 以指定配置创建
    pub fn with_config(metrics: M, config: PlaybackConfig) -> Self {
        Self {
            page: Page::new(&config),
            history: History::with_max_events(config.history_limit),
            style: StyleState::with_speed(config.default_speed_ms),
            config,
            metrics,
            parser: Parser::new(),
            script: Script::default(),
            state: PlaybackState::default(),
            events: VecDeque::new(),
            clock_ms: 0,
        }
    }

    /// 从 JSON 配置文本创建
    ///
    /// 配置无法解析或验证失败时返回 [`crate::error::DialogueError::Config`]。
    pub fn with_config_json(metrics: M, json: &str) -> DialogueResult<Self> {
        let config = PlaybackConfig::from_json_str(json)?;
        Ok(Self::with_config(metrics, config))
    }

    // =========================================================================
    // 加载
    // =========================================================================

    /// 编译并开始播放一段文本
    ///
    /// 无法识别的标签被丢弃，可通过 [`Self::issues`] 查看。
    pub fn show(&mut self, text: &str) {
        let script = self.parser.parse(text);
        self.load(script);
    }

    /// 截取分节并播放
    ///
    /// 标签不存在时改为播放一页错误提示，同时返回错误。
    pub fn show_section(&mut self, source: &str, label: Option<&str>) -> Result<(), LoadError> {
        match extract_section(source, label) {
            Ok(section) => {
                self.show(section);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "分节加载失败，显示错误页");
                self.show(&error_page(&err));
                Err(err)
            }
        }
    }

    /// 播放已编译的脚本
    ///
    /// 清空当前页、样式和事件队列，时钟归零；历史记录保留。
    pub fn load(&mut self, script: Script) {
        debug!(commands = script.commands().len(), "开始播放");
        self.script = script;
        self.state = PlaybackState::playing();
        self.style = StyleState::with_speed(self.config.default_speed_ms);
        self.page.clear();
        self.events.clear();
        self.clock_ms = 0;
    }

    // =========================================================================
    // 驱动
    // =========================================================================

    /// 每帧调用一次
    ///
    /// - `elapsed_ms`: 距上一帧经过的毫秒数
    /// - `advance`: 本帧是否收到推进输入（输入被禁用时忽略）
    pub fn update(&mut self, elapsed_ms: u32, advance: bool) {
        if !self.state.active {
            return;
        }
        self.clock_ms += u64::from(elapsed_ms);

        if self.state.forced_wait_ms > 0 {
            self.state.forced_wait_ms = self.state.forced_wait_ms.saturating_sub(elapsed_ms);
            if self.state.forced_wait_ms == 0 {
                debug!("计时等待结束，自动推进");
                self.advance();
            }
            return;
        }

        if advance && self.state.input_enabled {
            self.advance();
        }
        if !self.state.active || self.state.wait_input {
            return;
        }

        if self.state.pause_ms > 0 {
            self.state.pause_ms = self.state.pause_ms.saturating_sub(elapsed_ms);
            if self.state.pause_ms > 0 {
                return;
            }
        }

        if self.state.busy {
            self.state.char_timer_ms = self.state.char_timer_ms.saturating_add(elapsed_ms);
            self.drain(false);
        }
    }

    /// 推进一次
    ///
    /// 等待中翻页（脚本已结束则关闭），输出中立即完成当前页。
    /// 计时等待期间忽略；不受输入禁用标志影响。
    pub fn next(&mut self) {
        if self.state.forced_wait_ms > 0 {
            debug!(remaining_ms = self.state.forced_wait_ms, "计时等待中，忽略推进");
            return;
        }
        self.advance();
    }

    fn advance(&mut self) {
        if !self.state.active {
            self.state.close();
            return;
        }
        if self.state.wait_input {
            if self.state.script_ended || self.state.position >= self.script.commands().len() {
                self.close();
            } else {
                self.paginate();
            }
        } else if self.state.busy {
            self.skip();
        }
    }

    /// 翻页：清空当前页，跳过页首换行
    fn paginate(&mut self) {
        self.page.clear();
        while self
            .script
            .get(self.state.position)
            .is_some_and(|cmd| matches!(cmd, Command::NewLine))
        {
            self.state.position += 1;
        }
        self.state.start_page();
        debug!(position = self.state.position, "翻页");
    }

    /// 跳过：忽略暂停和逐字计时，立即输出到当前页结束
    fn skip(&mut self) {
        self.state.pause_ms = 0;
        self.drain(true);
        self.state.char_timer_ms = 0;
    }

    /// 排空指令
    ///
    /// 非即时模式下，消耗型指令需要逐字计时器攒够一个间隔才会执行。
    fn drain(&mut self, instant: bool) {
        loop {
            let command = self.script.get(self.state.position);
            if let Some(cmd) = command
                && cmd.consumes_time()
                && !instant
            {
                if self.state.char_timer_ms < self.style.speed_ms {
                    break;
                }
                self.state.char_timer_ms -= self.style.speed_ms;
            }

            let mut executor = Executor {
                state: &mut self.state,
                style: &mut self.style,
                page: &mut self.page,
                events: &mut self.events,
                history: &mut self.history,
                metrics: &self.metrics,
                default_speed_ms: self.config.default_speed_ms,
                clock_ms: self.clock_ms,
            };
            let flow = match command {
                Some(cmd) => {
                    executor.state.position += 1;
                    executor.execute(cmd, instant)
                }
                None => {
                    executor.finish_page();
                    Flow::Halt
                }
            };
            if flow == Flow::Halt {
                break;
            }
        }
    }

    // =========================================================================
    // 宿主操作
    // =========================================================================

    /// 关闭对话
    ///
    /// 清除所有标志和计时器并丢弃脚本；事件队列和历史记录保留。
    pub fn close(&mut self) {
        if self.state.active {
            debug!("对话关闭");
        }
        self.state.close();
        self.script = Script::default();
        self.page.clear();
    }

    /// 清空当前页的字形，光标回到原点
    pub fn clear(&mut self) {
        self.page.clear();
    }

    /// 取出最早的一个事件
    pub fn get_event(&mut self) -> Option<String> {
        self.events.pop_front()
    }

    /// 是否正在输出或等待推进
    pub fn is_busy(&self) -> bool {
        self.state.active && (self.state.busy || self.state.wait_input)
    }

    /// 是否应显示等待推进提示
    ///
    /// 计时等待期间不显示；按配置的周期闪烁。
    pub fn advance_indicator_visible(&self) -> bool {
        if !self.state.active || !self.state.wait_input || self.state.forced_wait_ms > 0 {
            return false;
        }
        let period = self.config.blink_period_ms;
        period == 0 || (self.clock_ms / period) % 2 == 0
    }

    // =========================================================================
    // 查询
    // =========================================================================

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    /// 当前页的字形快照
    pub fn glyphs(&self) -> &[GlyphEntry] {
        &self.page.glyphs
    }

    /// 当前页的纯文本
    pub fn page_text(&self) -> &str {
        &self.page.text
    }

    pub fn cursor(&self) -> Cursor {
        self.page.layout.cursor()
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn is_script_ended(&self) -> bool {
        self.state.script_ended
    }

    pub fn is_input_enabled(&self) -> bool {
        self.state.input_enabled
    }

    pub fn is_forced_wait(&self) -> bool {
        self.state.active && self.state.forced_wait_ms > 0
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// 最近一次 `show` 编译时丢弃的标签
    pub fn issues(&self) -> &[TagIssue] {
        self.parser.issues()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut M {
        &mut self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::NamedColor;
    use crate::error::{ConfigError, DialogueError};

    fn runtime_with_speed(speed_ms: u32) -> DialogueRuntime {
        let config = PlaybackConfig {
            default_speed_ms: speed_ms,
            ..PlaybackConfig::default()
        };
        DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), config)
    }

    fn text_of(runtime: &DialogueRuntime) -> String {
        runtime.glyphs().iter().filter_map(GlyphEntry::as_char).collect()
    }

    #[test]
    fn test_runtime_creation() {
        let runtime = runtime_with_speed(30);
        assert_eq!(runtime.phase(), PlaybackPhase::Idle);
        assert!(!runtime.is_busy());
        assert!(runtime.glyphs().is_empty());
    }

    #[test]
    fn test_wait_then_next_timing() {
        let mut runtime = runtime_with_speed(50);
        runtime.show("Hi[wait:10][next]");

        runtime.update(200, false);
        assert_eq!(text_of(&runtime), "Hi");
        assert_eq!(runtime.state().pause_ms, 10);
        assert_eq!(runtime.phase(), PlaybackPhase::Playing);

        runtime.update(200, false);
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
        assert!(runtime.is_busy());
    }

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut runtime = runtime_with_speed(100);
        runtime.show("abc");

        runtime.update(99, false);
        assert_eq!(text_of(&runtime), "");
        runtime.update(1, false);
        assert_eq!(text_of(&runtime), "a");
        runtime.update(250, false);
        assert_eq!(text_of(&runtime), "abc");
        // 剩余 50ms 不足以执行下一条消耗型指令，但 Next 不消耗时间
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
    }

    #[test]
    fn test_speed_change_applies_mid_page() {
        let mut runtime = runtime_with_speed(100);
        runtime.show("a[speed:10]bcd");

        runtime.update(100, false);
        assert_eq!(text_of(&runtime), "a");
        runtime.update(30, false);
        assert_eq!(text_of(&runtime), "abcd");
    }

    #[test]
    fn test_skip_completes_page() {
        let mut runtime = runtime_with_speed(1000);
        runtime.show("Hello[wait:5000] world[next]second");

        runtime.update(1, false);
        runtime.next();

        assert_eq!(text_of(&runtime), "Hello world");
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
    }

    #[test]
    fn test_advance_paginates_then_closes() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("one[next]\n\ntwo");

        runtime.update(100, false);
        assert_eq!(text_of(&runtime), "one");

        runtime.update(0, true);
        assert!(runtime.glyphs().is_empty());
        assert_eq!(runtime.cursor(), runtime.page.layout.origin());

        runtime.update(100, false);
        // 页首换行被跳过
        assert_eq!(text_of(&runtime), "two");
        assert_eq!(runtime.glyphs()[0].position, runtime.page.layout.origin());

        runtime.update(0, true);
        assert_eq!(runtime.phase(), PlaybackPhase::Idle);
        assert!(!runtime.is_busy());
    }

    #[test]
    fn test_end_closes_on_advance() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("bye[end]never shown");

        runtime.update(100, false);
        assert!(runtime.is_script_ended());
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);

        runtime.next();
        assert_eq!(runtime.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_forced_wait_auto_advances_and_ignores_input() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("a[next:300]b");

        runtime.update(10, false);
        assert_eq!(
            runtime.phase(),
            PlaybackPhase::ForcedWait { remaining_ms: 300 }
        );
        assert!(!runtime.advance_indicator_visible());

        runtime.next();
        runtime.update(100, true);
        assert_eq!(text_of(&runtime), "a");
        assert_eq!(
            runtime.phase(),
            PlaybackPhase::ForcedWait { remaining_ms: 200 }
        );

        runtime.update(200, false);
        assert_eq!(runtime.phase(), PlaybackPhase::Playing);
        assert!(runtime.glyphs().is_empty());

        runtime.update(10, false);
        assert_eq!(text_of(&runtime), "b");
    }

    #[test]
    fn test_forced_wait_runs_while_input_disabled() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("[input:disable]a[next:100]b");

        runtime.update(10, false);
        assert!(!runtime.is_input_enabled());
        assert_eq!(
            runtime.phase(),
            PlaybackPhase::ForcedWait { remaining_ms: 100 }
        );

        runtime.update(60, true);
        assert_eq!(
            runtime.phase(),
            PlaybackPhase::ForcedWait { remaining_ms: 40 }
        );
        assert_eq!(text_of(&runtime), "a");

        // 倒计时结束时即使输入被禁用也会翻页
        runtime.update(40, false);
        assert_eq!(runtime.phase(), PlaybackPhase::Playing);
        assert!(runtime.glyphs().is_empty());

        runtime.update(10, false);
        assert_eq!(text_of(&runtime), "b");
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);

        runtime.update(10, true);
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
        assert_eq!(text_of(&runtime), "b");
    }

    #[test]
    fn test_negative_next_breaks_page() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("a[next:-1]b");

        runtime.update(1000, false);
        assert_eq!(runtime.page_text(), "a");
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
    }

    #[test]
    fn test_input_disabled_blocks_update_signal() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("[input:disable]a[next]b");

        runtime.update(10, false);
        assert!(!runtime.is_input_enabled());
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);

        runtime.update(10, true);
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);
        assert_eq!(text_of(&runtime), "a");

        // 宿主直接调用 next 不受影响
        runtime.next();
        assert_eq!(runtime.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_events_are_fifo() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("[event:first]x[event:second][next]");
        runtime.update(10, false);

        assert_eq!(runtime.get_event().as_deref(), Some("first"));
        assert_eq!(runtime.get_event().as_deref(), Some("second"));
        assert_eq!(runtime.get_event(), None);
    }

    #[test]
    fn test_glyph_snapshots_are_frozen() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("[color:red]a[color:blue]b");
        runtime.update(10, false);

        assert_eq!(runtime.glyphs()[0].style.color, NamedColor::Red);
        assert_eq!(runtime.glyphs()[1].style.color, NamedColor::Blue);
        assert_eq!(runtime.style().color, NamedColor::Blue);
    }

    #[test]
    fn test_close_and_clear() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("ab[event:e]c");
        runtime.update(10, false);

        runtime.clear();
        assert!(runtime.glyphs().is_empty());
        assert_eq!(runtime.phase(), PlaybackPhase::Waiting);

        runtime.close();
        assert_eq!(runtime.phase(), PlaybackPhase::Idle);
        assert!(!runtime.is_busy());
        // 事件在关闭后仍可取出
        assert_eq!(runtime.get_event().as_deref(), Some("e"));

        // 关闭后 update 无效果
        runtime.update(1000, true);
        assert_eq!(runtime.clock_ms(), 10);
    }

    #[test]
    fn test_show_section_missing_label_shows_error_page() {
        let mut runtime = runtime_with_speed(1);
        let result = runtime.show_section("#A\nhello", Some("B"));

        assert_eq!(
            result,
            Err(LoadError::LabelNotFound {
                label: "B".to_string()
            })
        );
        runtime.update(1000, false);
        assert!(runtime.glyphs().iter().all(|g| g.style.color == NamedColor::Red));
        assert!(runtime.page_text().contains('B'));
    }

    #[test]
    fn test_history_records_pages() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("first[next]second");

        runtime.update(100, false);
        runtime.next();
        runtime.update(100, false);

        assert_eq!(runtime.history().pages(), vec!["first", "second"]);
    }

    #[test]
    fn test_indicator_blinks() {
        let config = PlaybackConfig {
            default_speed_ms: 1,
            blink_period_ms: 100,
            ..PlaybackConfig::default()
        };
        let mut runtime = DialogueRuntime::with_config(MonospaceMetrics::new(10.0, 20.0), config);
        runtime.show("x");

        runtime.update(50, false);
        assert!(runtime.advance_indicator_visible());
        runtime.update(100, false);
        assert!(!runtime.advance_indicator_visible());
        runtime.update(100, false);
        assert!(runtime.advance_indicator_visible());
    }

    #[test]
    fn test_with_config_json() {
        let runtime =
            DialogueRuntime::with_config_json(MonospaceMetrics::new(10.0, 20.0), r#"{ "kerning": 3.0 }"#)
                .unwrap();
        assert_eq!(runtime.config().kerning, 3.0);

        let err = DialogueRuntime::with_config_json(
            MonospaceMetrics::new(10.0, 20.0),
            r#"{ "default_speed_ms": 0 }"#,
        )
        .err();
        assert!(matches!(
            err,
            Some(DialogueError::Config(ConfigError::Validation { .. }))
        ));
    }

    #[test]
    fn test_unknown_tags_are_reported() {
        let mut runtime = runtime_with_speed(1);
        runtime.show("a[bogus]b");
        assert_eq!(runtime.issues().len(), 1);
        runtime.update(10, false);
        assert_eq!(text_of(&runtime), "ab");
    }
}
