//! # App 模块
//!
//! 宿主帧循环：持有 [`GimmickManager`]，把攻击事件转换为评论通知。
//!
//! ## 每帧流程
//!
//! ```text
//! report_attack(event) ──► AttackEventBus ──► inbox
//! frame(dt):
//!   1. 取出 inbox 中的攻击事件
//!   2. 选取评论，推送到通知窗口，通知标签计数 +1
//!   3. manager.update(dt)
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use battle_runtime::{
    ActorId, AttackEvent, AttackEventBus, BattleResult, CommentCatalog, CommentCategory,
    CycleReport, GimmickManager, ManagerState, TabNotificationGimmick, Vec3,
    WindowNotificationGimmick,
};
use tracing::{debug, info};

use crate::config::AppConfig;

/// 一次 headless 运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 执行的帧数
    pub frames: u64,
    /// 处理的攻击事件数
    pub attacks: usize,
    /// 显示完毕的评论数
    pub comments_shown: usize,
    /// 被隔离的 Gimmick 回调失败数
    pub failures: usize,
}

/// 战斗宿主
pub struct BattleApp {
    manager: GimmickManager,
    catalog: CommentCatalog,
    bus: AttackEventBus,
    inbox: Rc<RefCell<Vec<AttackEvent>>>,
    comment_category: CommentCategory,
    next_comment: usize,
    attacks: usize,
    failures: usize,
}

impl BattleApp {
    /// 创建宿主
    ///
    /// 配置的评论分类必须在评论表中存在，否则返回错误。
    pub fn new(config: &AppConfig, catalog: CommentCatalog) -> BattleResult<Self> {
        let comment_category = config.battle.comment_category;
        catalog.lookup(comment_category, None)?;

        let manager = GimmickManager::new(
            TabNotificationGimmick::new(&config.gimmicks),
            WindowNotificationGimmick::new(&config.gimmicks),
        );

        let inbox = Rc::new(RefCell::new(Vec::new()));
        let mut bus = AttackEventBus::new();
        let sink = inbox.clone();
        bus.subscribe(move |event| sink.borrow_mut().push(*event));

        Ok(Self {
            manager,
            catalog,
            bus,
            inbox,
            comment_category,
            next_comment: 0,
            attacks: 0,
            failures: 0,
        })
    }

    pub fn manager(&self) -> &GimmickManager {
        &self.manager
    }

    /// 事件总线，供其他订阅者注册
    pub fn bus_mut(&mut self) -> &mut AttackEventBus {
        &mut self.bus
    }

    /// 激活：初始化所有 Gimmick
    pub fn start(&mut self) -> BattleResult<CycleReport> {
        let report = self.manager.init()?;
        self.failures += report.failures.len();
        Ok(report)
    }

    /// 上报一次攻击结算
    ///
    /// 停用后上报的事件直接丢弃，返回 0。
    pub fn report_attack(&mut self, event: AttackEvent) -> usize {
        if self.manager.state() == ManagerState::Released {
            debug!(attacker = %event.attacker, "宿主已停用，丢弃攻击事件");
            return 0;
        }
        self.bus.publish(&event)
    }

    /// 尚未处理的攻击事件数量
    pub fn pending_attacks(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// 推进一帧
    pub fn frame(&mut self, delta_seconds: f32) -> BattleResult<CycleReport> {
        if self.manager.state() == ManagerState::Active {
            let events: Vec<AttackEvent> = self.inbox.borrow_mut().drain(..).collect();
            for event in events {
                self.handle_attack(&event)?;
            }
        }

        let report = self.manager.update(delta_seconds)?;
        self.failures += report.failures.len();
        Ok(report)
    }

    /// 停用：释放所有 Gimmick
    pub fn shutdown(&mut self) -> BattleResult<CycleReport> {
        let report = self.manager.release()?;
        self.inbox.borrow_mut().clear();
        self.failures += report.failures.len();
        Ok(report)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.manager.frame_count(),
            attacks: self.attacks,
            comments_shown: self
                .manager
                .get::<WindowNotificationGimmick>()
                .map_or(0, |window| window.shown()),
            failures: self.failures,
        }
    }

    fn handle_attack(&mut self, event: &AttackEvent) -> BattleResult<()> {
        let comment = self.next_comment_text()?;
        debug!(
            attacker = %event.attacker,
            target = %event.target,
            comment = %comment,
            "攻击命中"
        );

        if let Some(window) = self.manager.get_mut::<WindowNotificationGimmick>() {
            window.push(comment);
        }
        if let Some(tab) = self.manager.get_mut::<TabNotificationGimmick>() {
            tab.notify();
        }
        self.attacks += 1;
        Ok(())
    }

    /// 按顺序轮流选取评论
    fn next_comment_text(&mut self) -> BattleResult<String> {
        let candidates = self.catalog.lookup(self.comment_category, None)?;
        let text = candidates[self.next_comment % candidates.len()].clone();
        self.next_comment = self.next_comment.wrapping_add(1);
        Ok(text)
    }
}

/// headless 运行
///
/// 运行 `config.frame.frames` 帧，每 `attack_every` 帧产生一次模拟攻击。
pub fn run(config: &AppConfig, catalog: CommentCatalog) -> BattleResult<RunSummary> {
    let mut app = BattleApp::new(config, catalog)?;
    app.start()?;

    let fixed_delta = config.frame_delta();
    let frame_budget = Duration::from_secs_f32(fixed_delta);
    let mut last = Instant::now();

    for frame in 0..config.frame.frames {
        if config.frame.attack_every > 0 && (frame + 1) % config.frame.attack_every == 0 {
            let offset = frame as f32 * 0.01;
            app.report_attack(AttackEvent::new(
                ActorId(1),
                ActorId(2),
                Vec3::new(offset, 1.0, 0.0),
            ));
        }

        let delta = if config.frame.realtime {
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            elapsed.as_secs_f32()
        } else {
            fixed_delta
        };
        app.frame(delta)?;

        if config.frame.realtime {
            let spent = last.elapsed();
            if spent < frame_budget {
                thread::sleep(frame_budget - spent);
            }
        }
    }

    app.shutdown()?;
    let summary = app.summary();
    info!(
        frames = summary.frames,
        attacks = summary.attacks,
        comments_shown = summary.comments_shown,
        failures = summary.failures,
        "运行结束"
    );
    Ok(summary)
}
