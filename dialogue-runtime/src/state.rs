//! # State 模块
//!
//! 定义播放解释器的样式状态和播放状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，由解释器独占并通过访问器暴露
//! - 不允许隐式全局状态
//! - 输入开关不属于样式，`[reset]` 不会重新打开被禁用的输入

use serde::{Deserialize, Serialize};

use crate::command::{NamedColor, SIZE_BASE, Shake};

/// 默认逐字显示间隔（毫秒）
pub const DEFAULT_SPEED_MS: u32 = 30;

/// 当前文字样式
///
/// 在 `show` 时初始化为默认值，由 `Set*` 指令修改，由 `Reset` 恢复。
/// 每个字形在创建时复制一份快照，之后的样式变化不会影响已显示的字形。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleState {
    /// 缩放比例
    pub scale: f32,
    /// 文字颜色
    pub color: NamedColor,
    /// 旋转角度（度）
    pub rotation: f32,
    /// 字体（None 表示默认字体）
    pub font: Option<String>,
    /// 抖动参数
    pub shake: Shake,
    /// 逐字显示间隔（毫秒，至少为 1）
    pub speed_ms: u32,
}

impl StyleState {
    /// 以指定的默认速度创建样式
    pub fn with_speed(speed_ms: u32) -> Self {
        Self {
            scale: 1.0,
            color: NamedColor::White,
            rotation: 0.0,
            font: None,
            shake: Shake::none(),
            speed_ms: speed_ms.max(1),
        }
    }

    /// 按 `[size:n]` 的值设置缩放
    pub fn set_size(&mut self, size: i32) {
        self.scale = size as f32 / SIZE_BASE;
    }

    /// 设置速度（钳制为至少 1 毫秒）
    pub fn set_speed(&mut self, speed_ms: u32) {
        self.speed_ms = speed_ms.max(1);
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::with_speed(DEFAULT_SPEED_MS)
    }
}

/// 播放阶段
///
/// # 状态转换
///
/// ```text
/// Idle ──show──► Playing ──Next/End──► Waiting ──advance──► Playing（翻页）
///                                         │
///                                         └──advance（脚本结束）──► Idle
/// ForcedWait：Next(ms>0) 进入的计时等待，倒计时归零时等同于一次推进
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// 未激活（已关闭）
    Idle,
    /// 正在逐字输出当前页
    Playing,
    /// 当前页已完成，等待推进
    Waiting,
    /// 计时等待，倒计时结束后自动推进
    ForcedWait { remaining_ms: u32 },
}

impl PlaybackPhase {
    /// 是否处于等待推进状态（含计时等待）
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting | Self::ForcedWait { .. })
    }
}

/// 播放状态
///
/// 解释器的全部可变控制状态：标志位、计时器和指令游标。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// 是否激活
    pub active: bool,
    /// 是否正在输出当前页
    pub busy: bool,
    /// 当前页已完成，等待推进
    pub wait_input: bool,
    /// 是否已执行到 `End`
    pub script_ended: bool,
    /// 是否响应外部推进/跳过输入
    pub input_enabled: bool,
    /// 下一条待执行指令的索引
    pub position: usize,
    /// 逐字计时器累积的毫秒数
    pub char_timer_ms: u32,
    /// `Wait` 指令剩余的暂停毫秒数
    pub pause_ms: u32,
    /// 计时等待剩余的毫秒数（0 表示未处于计时等待）
    pub forced_wait_ms: u32,
}

impl PlaybackState {
    /// 创建刚开始播放的状态
    pub fn playing() -> Self {
        Self {
            active: true,
            busy: true,
            input_enabled: true,
            ..Self::default()
        }
    }

    /// 当前播放阶段
    pub fn phase(&self) -> PlaybackPhase {
        if !self.active {
            PlaybackPhase::Idle
        } else if self.wait_input {
            if self.forced_wait_ms > 0 {
                PlaybackPhase::ForcedWait {
                    remaining_ms: self.forced_wait_ms,
                }
            } else {
                PlaybackPhase::Waiting
            }
        } else {
            PlaybackPhase::Playing
        }
    }

    /// 当前页完成，进入等待推进
    pub fn finish_page(&mut self) {
        self.busy = false;
        self.wait_input = true;
    }

    /// 开始新的一页
    pub fn start_page(&mut self) {
        self.wait_input = false;
        self.forced_wait_ms = 0;
        self.pause_ms = 0;
        self.char_timer_ms = 0;
        self.busy = true;
    }

    /// 关闭：清除所有标志和计时器
    pub fn close(&mut self) {
        *self = Self {
            input_enabled: self.input_enabled,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_defaults() {
        let style = StyleState::default();
        assert_eq!(style.scale, 1.0);
        assert_eq!(style.color, NamedColor::White);
        assert_eq!(style.rotation, 0.0);
        assert_eq!(style.font, None);
        assert!(!style.shake.is_active());
        assert_eq!(style.speed_ms, DEFAULT_SPEED_MS);
    }

    #[test]
    fn test_style_speed_is_clamped() {
        assert_eq!(StyleState::with_speed(0).speed_ms, 1);

        let mut style = StyleState::default();
        style.set_speed(0);
        assert_eq!(style.speed_ms, 1);
    }

    #[test]
    fn test_style_set_size() {
        let mut style = StyleState::default();
        style.set_size(48);
        assert_eq!(style.scale, 2.0);
        style.set_size(12);
        assert_eq!(style.scale, 0.5);
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = PlaybackState::default();
        assert_eq!(state.phase(), PlaybackPhase::Idle);

        state = PlaybackState::playing();
        assert_eq!(state.phase(), PlaybackPhase::Playing);
        assert!(state.input_enabled);

        state.finish_page();
        assert_eq!(state.phase(), PlaybackPhase::Waiting);
        assert!(state.phase().is_waiting());

        state.forced_wait_ms = 300;
        assert_eq!(
            state.phase(),
            PlaybackPhase::ForcedWait { remaining_ms: 300 }
        );

        state.start_page();
        assert_eq!(state.phase(), PlaybackPhase::Playing);
        assert_eq!(state.forced_wait_ms, 0);

        state.close();
        assert_eq!(state.phase(), PlaybackPhase::Idle);
        assert!(!state.busy);
        assert!(!state.wait_input);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = PlaybackState::playing();
        state.position = 7;
        state.finish_page();

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: PlaybackState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
