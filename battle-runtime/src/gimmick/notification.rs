//! # Notification 模块
//!
//! 两种通知类 Gimmick：
//!
//! - [`TabNotificationGimmick`]：有未读时闪烁的通知标签
//! - [`WindowNotificationGimmick`]：逐条显示消息的通知窗口，末尾淡出

use std::any::Any;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Gimmick;
use crate::error::GimmickResult;

/// 通知 Gimmick 的参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GimmickConfig {
    /// 标签闪烁间隔（秒）
    #[serde(default = "default_blink_interval")]
    pub blink_interval: f32,

    /// 每条窗口消息的显示时长（秒）
    #[serde(default = "default_display_duration")]
    pub display_duration: f32,

    /// 窗口消息末尾的淡出时长（秒）
    #[serde(default = "default_fade_duration")]
    pub fade_duration: f32,
}

fn default_blink_interval() -> f32 {
    0.5
}

fn default_display_duration() -> f32 {
    2.5
}

fn default_fade_duration() -> f32 {
    0.3
}

impl Default for GimmickConfig {
    fn default() -> Self {
        Self {
            blink_interval: default_blink_interval(),
            display_duration: default_display_duration(),
            fade_duration: default_fade_duration(),
        }
    }
}

// ========== 通知标签 ==========

/// 通知标签
///
/// 有未读通知时，每隔 `blink_interval` 秒切换一次高亮。
#[derive(Debug, Clone)]
pub struct TabNotificationGimmick {
    visible: bool,
    unread: u32,
    highlighted: bool,
    blink_timer: f32,
    blink_interval: f32,
}

impl TabNotificationGimmick {
    pub const NAME: &'static str = "tab_notification";

    pub fn new(config: &GimmickConfig) -> Self {
        Self {
            visible: false,
            unread: 0,
            highlighted: false,
            blink_timer: 0.0,
            blink_interval: config.blink_interval,
        }
    }

    /// 新增一条未读通知
    pub fn notify(&mut self) {
        self.unread = self.unread.saturating_add(1);
    }

    /// 标记全部已读
    pub fn acknowledge(&mut self) {
        self.unread = 0;
        self.highlighted = false;
        self.blink_timer = 0.0;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn unread(&self) -> u32 {
        self.unread
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    fn reset(&mut self) {
        self.unread = 0;
        self.highlighted = false;
        self.blink_timer = 0.0;
    }
}

impl Gimmick for TabNotificationGimmick {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_enter(&mut self) -> GimmickResult<()> {
        // 进入前的未读保留，只重置闪烁状态
        self.highlighted = false;
        self.blink_timer = 0.0;
        self.visible = true;
        Ok(())
    }

    fn on_update(&mut self, delta_seconds: f32) -> GimmickResult<()> {
        if !self.visible || self.unread == 0 || self.blink_interval <= 0.0 {
            return Ok(());
        }

        self.blink_timer += delta_seconds;
        while self.blink_timer >= self.blink_interval {
            self.blink_timer -= self.blink_interval;
            self.highlighted = !self.highlighted;
        }
        Ok(())
    }

    fn on_exit(&mut self) -> GimmickResult<()> {
        self.visible = false;
        self.reset();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ========== 通知窗口 ==========

/// 通知窗口中的单条消息
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// 消息内容
    pub message: String,
    /// 剩余显示时间
    pub remaining_time: f32,
    /// 淡出进度 (0.0 - 1.0)
    pub fade_progress: f32,
}

impl Notice {
    fn new(message: String, duration: f32) -> Self {
        Self {
            message,
            remaining_time: duration,
            fade_progress: 0.0,
        }
    }

    /// 更新状态，返回是否应该移除
    fn update(&mut self, dt: f32, fade_duration: f32) -> bool {
        self.remaining_time -= dt;

        if fade_duration > 0.0 && self.remaining_time <= fade_duration {
            self.fade_progress = 1.0 - (self.remaining_time / fade_duration).max(0.0);
        }

        self.remaining_time <= 0.0
    }
}

/// 通知窗口
///
/// 消息按入队顺序逐条显示，同一时刻只显示队首。
#[derive(Debug, Clone)]
pub struct WindowNotificationGimmick {
    open: bool,
    queue: VecDeque<Notice>,
    shown: usize,
    display_duration: f32,
    fade_duration: f32,
}

impl WindowNotificationGimmick {
    pub const NAME: &'static str = "window_notification";

    pub fn new(config: &GimmickConfig) -> Self {
        Self {
            open: false,
            queue: VecDeque::new(),
            shown: 0,
            display_duration: config.display_duration,
            fade_duration: config.fade_duration,
        }
    }

    /// 消息入队
    pub fn push(&mut self, message: impl Into<String>) {
        self.queue
            .push_back(Notice::new(message.into(), self.display_duration));
    }

    /// 当前显示的消息
    pub fn current(&self) -> Option<&Notice> {
        if self.open { self.queue.front() } else { None }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// 排队中的消息数量（含当前显示的）
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// 已经显示完毕的消息数量
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Gimmick for WindowNotificationGimmick {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_enter(&mut self) -> GimmickResult<()> {
        self.open = true;
        self.shown = 0;
        Ok(())
    }

    fn on_update(&mut self, delta_seconds: f32) -> GimmickResult<()> {
        if !self.open {
            return Ok(());
        }

        // 一帧内可能连续过期多条，剩余时间顺延给下一条
        let mut dt = delta_seconds;
        while let Some(notice) = self.queue.front_mut() {
            if !notice.update(dt, self.fade_duration) {
                break;
            }
            dt = -notice.remaining_time;
            self.queue.pop_front();
            self.shown += 1;
            if dt <= 0.0 {
                break;
            }
        }
        Ok(())
    }

    fn on_exit(&mut self) -> GimmickResult<()> {
        self.open = false;
        self.queue.clear();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GimmickConfig {
        GimmickConfig {
            blink_interval: 0.5,
            display_duration: 1.0,
            fade_duration: 0.5,
        }
    }

    #[test]
    fn test_default_config() {
        let config = GimmickConfig::default();
        assert_eq!(config.blink_interval, 0.5);
        assert_eq!(config.display_duration, 2.5);
        assert_eq!(config.fade_duration, 0.3);

        let parsed: GimmickConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_tab_visibility() {
        let mut tab = TabNotificationGimmick::new(&config());
        assert!(!tab.is_visible());

        tab.on_enter().unwrap();
        assert!(tab.is_visible());

        tab.on_exit().unwrap();
        assert!(!tab.is_visible());
    }

    #[test]
    fn test_tab_blinks_only_with_unread() {
        let mut tab = TabNotificationGimmick::new(&config());
        tab.on_enter().unwrap();

        // 没有未读时不闪烁
        tab.on_update(1.0).unwrap();
        assert!(!tab.is_highlighted());

        tab.notify();
        tab.notify();
        assert_eq!(tab.unread(), 2);

        tab.on_update(0.25).unwrap();
        assert!(!tab.is_highlighted());
        tab.on_update(0.25).unwrap();
        assert!(tab.is_highlighted());
        tab.on_update(0.5).unwrap();
        assert!(!tab.is_highlighted());

        tab.acknowledge();
        assert_eq!(tab.unread(), 0);
        tab.on_update(0.5).unwrap();
        assert!(!tab.is_highlighted());
    }

    #[test]
    fn test_tab_keeps_unread_from_before_enter() {
        let mut tab = TabNotificationGimmick::new(&config());
        tab.notify();

        tab.on_enter().unwrap();
        assert_eq!(tab.unread(), 1);
        assert!(!tab.is_highlighted());

        tab.on_update(0.5).unwrap();
        assert!(tab.is_highlighted());
    }

    #[test]
    fn test_tab_exit_clears_unread() {
        let mut tab = TabNotificationGimmick::new(&config());
        tab.on_enter().unwrap();
        tab.notify();
        tab.on_exit().unwrap();
        assert_eq!(tab.unread(), 0);
    }

    #[test]
    fn test_window_shows_messages_in_order() {
        let mut window = WindowNotificationGimmick::new(&config());
        window.push("first");
        window.push("second");

        // 未打开时不显示
        assert!(window.current().is_none());

        window.on_enter().unwrap();
        assert_eq!(window.current().unwrap().message, "first");

        window.on_update(0.75).unwrap();
        let current = window.current().unwrap();
        assert_eq!(current.message, "first");
        assert!((current.fade_progress - 0.5).abs() < 1e-6);

        window.on_update(0.25).unwrap();
        assert_eq!(window.current().unwrap().message, "second");
        assert_eq!(window.shown(), 1);

        window.on_update(1.0).unwrap();
        assert!(window.current().is_none());
        assert_eq!(window.shown(), 2);
    }

    #[test]
    fn test_window_long_frame_drains_backlog() {
        let mut window = WindowNotificationGimmick::new(&config());
        window.on_enter().unwrap();
        window.push("a");
        window.push("b");
        window.push("c");

        // 一次 2.5 秒的卡顿：a、b 过期，c 消耗剩余的 0.5 秒
        window.on_update(2.5).unwrap();
        assert_eq!(window.shown(), 2);
        let current = window.current().unwrap();
        assert_eq!(current.message, "c");
        assert!((current.remaining_time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_window_exit_drops_queue() {
        let mut window = WindowNotificationGimmick::new(&config());
        window.on_enter().unwrap();
        window.push("a");
        window.push("b");
        assert_eq!(window.pending(), 2);

        window.on_exit().unwrap();
        assert!(!window.is_open());
        assert_eq!(window.pending(), 0);
    }
}
