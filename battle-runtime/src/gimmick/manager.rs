//! # Manager 模块
//!
//! Gimmick 生命周期管理器。
//!
//! ## 执行模型
//!
//! ```text
//! init()        -> 注册 Gimmick，按顺序调用 on_enter
//! update(dt)    -> 按顺序调用 on_update(dt)，每帧一次
//! release()     -> 按顺序调用 on_exit，之后不可再用
//! ```
//!
//! 管理器由宿主显式创建并持有，不是全局单例；
//! 所有方法都需要 `&mut self`，回调因此天然串行。

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Gimmick;
use super::notification::{TabNotificationGimmick, WindowNotificationGimmick};
use crate::error::{GimmickError, GimmickResult, LifecycleError};

/// 管理器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerState {
    /// 已创建，尚未 init
    Uninitialized,
    /// 已 init，每帧接受 update
    Active,
    /// 已释放（终态）
    Released,
}

/// 回调阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GimmickPhase {
    Enter,
    Update,
    Exit,
}

/// 单个 Gimmick 的回调失败记录
#[derive(Debug, Clone, PartialEq)]
pub struct GimmickFailure {
    /// 在集合中的位置
    pub index: usize,
    /// 失败的阶段
    pub phase: GimmickPhase,
    /// 回调返回的错误
    pub error: GimmickError,
}

/// 一次 enter/update/exit 循环的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// 收到回调的 Gimmick 数量
    pub invoked: usize,
    /// 回调失败的记录（已隔离，不影响其他 Gimmick）
    pub failures: Vec<GimmickFailure>,
}

impl CycleReport {
    /// 是否所有回调都成功
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Gimmick 管理器
///
/// 持有有序的 Gimmick 集合，按集合顺序驱动生命周期。
///
/// # 使用示例
///
/// ```ignore
/// let config = GimmickConfig::default();
/// let mut manager = GimmickManager::new(
///     TabNotificationGimmick::new(&config),
///     WindowNotificationGimmick::new(&config),
/// );
///
/// manager.init()?;
/// loop {
///     manager.update(dt)?;
/// }
/// manager.release()?;
/// ```
pub struct GimmickManager {
    /// init 时注册的 Gimmick
    pending: Vec<Box<dyn Gimmick>>,
    /// 已注册的 Gimmick（注册顺序即回调顺序）
    gimmicks: Vec<Box<dyn Gimmick>>,
    /// 当前状态
    state: ManagerState,
    /// 已收到 on_enter 的 Gimmick 数量（集合前缀）
    entered: usize,
    /// 已完成的 update 次数
    frame_count: u64,
}

impl fmt::Debug for GimmickManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GimmickManager")
            .field("state", &self.state)
            .field("gimmicks", &self.names())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl GimmickManager {
    /// 创建战斗用管理器
    ///
    /// 集合成员固定，顺序为 {通知标签, 通知窗口}。
    pub fn new(tab: TabNotificationGimmick, window: WindowNotificationGimmick) -> Self {
        Self::with_gimmicks(vec![Box::new(tab), Box::new(window)])
    }

    /// 使用任意有序的 Gimmick 集合创建管理器
    pub fn with_gimmicks(gimmicks: Vec<Box<dyn Gimmick>>) -> Self {
        Self {
            pending: gimmicks,
            gimmicks: Vec::new(),
            state: ManagerState::Uninitialized,
            entered: 0,
            frame_count: 0,
        }
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// 已注册的 Gimmick 数量
    pub fn len(&self) -> usize {
        self.gimmicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gimmicks.is_empty()
    }

    /// 已注册 Gimmick 的名称（按集合顺序）
    pub fn names(&self) -> Vec<&str> {
        self.gimmicks.iter().map(|g| g.name()).collect()
    }

    /// 已完成的 update 次数
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// 按具体类型获取 Gimmick
    ///
    /// init 之前也可以获取到待注册的 Gimmick。
    pub fn get<T: Gimmick>(&self) -> Option<&T> {
        self.gimmicks
            .iter()
            .chain(self.pending.iter())
            .find_map(|g| g.as_any().downcast_ref::<T>())
    }

    /// 按具体类型获取 Gimmick（可变）
    pub fn get_mut<T: Gimmick>(&mut self) -> Option<&mut T> {
        self.gimmicks
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find_map(|g| g.as_any_mut().downcast_mut::<T>())
    }

    // ========== 生命周期 ==========

    /// 初始化：Uninitialized → Active
    ///
    /// 注册所有 Gimmick 并按顺序调用 `on_enter`，全部调用完毕后返回。
    pub fn init(&mut self) -> Result<CycleReport, LifecycleError> {
        self.expect_state("init", ManagerState::Uninitialized)?;

        self.gimmicks = std::mem::take(&mut self.pending);
        self.state = ManagerState::Active;

        let report = self.dispatch(GimmickPhase::Enter, |g| g.on_enter());
        info!(gimmicks = ?self.names(), "GimmickManager 初始化完成");
        Ok(report)
    }

    /// 每帧更新
    ///
    /// # 参数
    /// - `delta_seconds`: 距上一帧经过的时间（秒），必须是有限的非负数
    pub fn update(&mut self, delta_seconds: f32) -> Result<CycleReport, LifecycleError> {
        self.expect_state("update", ManagerState::Active)?;
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(LifecycleError::InvalidDeltaTime {
                delta: delta_seconds,
            });
        }

        let report = self.dispatch(GimmickPhase::Update, |g| g.on_update(delta_seconds));
        self.frame_count += 1;
        Ok(report)
    }

    /// 释放：Active → Released
    ///
    /// 按与 init/update 相同的顺序调用 `on_exit`。释放后管理器不可再用。
    pub fn release(&mut self) -> Result<CycleReport, LifecycleError> {
        self.expect_state("release", ManagerState::Active)?;

        let report = self.dispatch(GimmickPhase::Exit, |g| g.on_exit());
        self.state = ManagerState::Released;
        info!(frames = self.frame_count, "GimmickManager 已释放");
        Ok(report)
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: ManagerState,
    ) -> Result<(), LifecycleError> {
        if self.state != expected {
            return Err(LifecycleError::InvalidState {
                operation,
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// 按集合顺序调用回调，单个失败只记录不中断
    ///
    /// update/exit 只发给已经收到 on_enter 的 Gimmick。
    fn dispatch<F>(&mut self, phase: GimmickPhase, mut callback: F) -> CycleReport
    where
        F: FnMut(&mut dyn Gimmick) -> GimmickResult<()>,
    {
        let count = match phase {
            GimmickPhase::Enter => self.gimmicks.len(),
            GimmickPhase::Update | GimmickPhase::Exit => self.entered,
        };

        let mut report = CycleReport::default();
        for (index, gimmick) in self.gimmicks.iter_mut().enumerate().take(count) {
            // 先计数再回调：回调中途 panic 的 Gimmick 也算已进入
            if phase == GimmickPhase::Enter {
                self.entered = index + 1;
            }
            report.invoked += 1;
            if let Err(error) = callback(gimmick.as_mut()) {
                warn!(
                    gimmick = gimmick.name(),
                    phase = ?phase,
                    error = %error,
                    "Gimmick 回调失败，已跳过"
                );
                report.failures.push(GimmickFailure {
                    index,
                    phase,
                    error,
                });
            }
        }
        report
    }
}

impl Drop for GimmickManager {
    fn drop(&mut self) {
        // 展开过程中不再调用 Gimmick 回调
        if self.state == ManagerState::Active && !std::thread::panicking() {
            debug!("GimmickManager 在 Active 状态下被丢弃，执行释放");
            let _ = self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gimmick::GimmickConfig;
    use std::any::Any;
    use std::cell::RefCell;
    use std::panic::AssertUnwindSafe;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Enter(&'static str),
        Update(&'static str, f32),
        Exit(&'static str),
    }

    type Trace = Rc<RefCell<Vec<Call>>>;

    struct Recording {
        name: &'static str,
        trace: Trace,
        fail_update: bool,
        panic_enter: bool,
    }

    impl Recording {
        fn boxed(name: &'static str, trace: &Trace) -> Box<dyn Gimmick> {
            Box::new(Self {
                name,
                trace: trace.clone(),
                fail_update: false,
                panic_enter: false,
            })
        }

        fn failing(name: &'static str, trace: &Trace) -> Box<dyn Gimmick> {
            Box::new(Self {
                name,
                trace: trace.clone(),
                fail_update: true,
                panic_enter: false,
            })
        }

        fn panicking(name: &'static str, trace: &Trace) -> Box<dyn Gimmick> {
            Box::new(Self {
                name,
                trace: trace.clone(),
                fail_update: false,
                panic_enter: true,
            })
        }
    }

    impl Gimmick for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn on_enter(&mut self) -> GimmickResult<()> {
            self.trace.borrow_mut().push(Call::Enter(self.name));
            if self.panic_enter {
                panic!("{} failed to enter", self.name);
            }
            Ok(())
        }

        fn on_update(&mut self, delta_seconds: f32) -> GimmickResult<()> {
            self.trace
                .borrow_mut()
                .push(Call::Update(self.name, delta_seconds));
            if self.fail_update {
                return Err(GimmickError::failed(self.name, "boom"));
            }
            Ok(())
        }

        fn on_exit(&mut self) -> GimmickResult<()> {
            self.trace.borrow_mut().push(Call::Exit(self.name));
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn recording_manager(trace: &Trace) -> GimmickManager {
        GimmickManager::with_gimmicks(vec![
            Recording::boxed("a", trace),
            Recording::boxed("b", trace),
        ])
    }

    #[test]
    fn test_lifecycle_trace() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);

        manager.init().unwrap();
        manager.update(0.016).unwrap();
        manager.update(0.033).unwrap();
        manager.release().unwrap();

        insta::assert_debug_snapshot!(trace.borrow(), @r#"
        [
            Enter(
                "a",
            ),
            Enter(
                "b",
            ),
            Update(
                "a",
                0.016,
            ),
            Update(
                "b",
                0.016,
            ),
            Update(
                "a",
                0.033,
            ),
            Update(
                "b",
                0.033,
            ),
            Exit(
                "a",
            ),
            Exit(
                "b",
            ),
        ]
        "#);
        assert_eq!(manager.frame_count(), 2);
        assert_eq!(manager.state(), ManagerState::Released);
    }

    #[test]
    fn test_enter_precedes_any_update() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);

        manager.init().unwrap();
        assert_eq!(trace.borrow().len(), 2);
        assert!(
            trace
                .borrow()
                .iter()
                .all(|call| matches!(call, Call::Enter(_)))
        );
    }

    #[test]
    fn test_update_before_init_fails() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);

        let err = manager.update(0.016).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidState {
                operation: "update",
                expected: ManagerState::Active,
                actual: ManagerState::Uninitialized,
            }
        );
        assert!(trace.borrow().is_empty());
    }

    #[test]
    fn test_init_twice_fails() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);

        manager.init().unwrap();
        let err = manager.init().unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidState {
                operation: "init",
                actual: ManagerState::Active,
                ..
            }
        ));
        // 第二次 init 不会重复调用 on_enter
        assert_eq!(trace.borrow().len(), 2);
    }

    #[test]
    fn test_released_manager_is_not_reusable() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);

        manager.init().unwrap();
        manager.release().unwrap();

        assert!(manager.update(0.016).is_err());
        assert!(manager.release().is_err());
        assert!(manager.init().is_err());
    }

    #[test]
    fn test_release_before_init_fails() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);
        assert!(manager.release().is_err());
        drop(manager);
        assert!(trace.borrow().is_empty());
    }

    #[test]
    fn test_invalid_delta_time() {
        let trace = Trace::default();
        let mut manager = recording_manager(&trace);
        manager.init().unwrap();

        assert!(matches!(
            manager.update(-0.1),
            Err(LifecycleError::InvalidDeltaTime { .. })
        ));
        assert!(matches!(
            manager.update(f32::NAN),
            Err(LifecycleError::InvalidDeltaTime { .. })
        ));
        assert_eq!(manager.frame_count(), 0);
        assert_eq!(trace.borrow().len(), 2);

        // 0 是合法的帧间隔
        manager.update(0.0).unwrap();
        assert_eq!(manager.frame_count(), 1);
    }

    #[test]
    fn test_failure_is_isolated() {
        let trace = Trace::default();
        let mut manager = GimmickManager::with_gimmicks(vec![
            Recording::failing("bad", &trace),
            Recording::boxed("good", &trace),
        ]);

        manager.init().unwrap();
        let report = manager.update(0.5).unwrap();

        assert_eq!(report.invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 0);
        assert_eq!(report.failures[0].phase, GimmickPhase::Update);
        assert!(trace.borrow().contains(&Call::Update("good", 0.5)));
    }

    #[test]
    fn test_drop_while_active_runs_exit() {
        let trace = Trace::default();
        {
            let mut manager = recording_manager(&trace);
            manager.init().unwrap();
            manager.update(0.1).unwrap();
        }
        let trace = trace.borrow();
        assert_eq!(trace[trace.len() - 2], Call::Exit("a"));
        assert_eq!(trace[trace.len() - 1], Call::Exit("b"));
    }

    #[test]
    fn test_panic_in_enter_skips_exit_while_unwinding() {
        let trace = Trace::default();
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let mut manager = GimmickManager::with_gimmicks(vec![
                Recording::panicking("a", &trace),
                Recording::boxed("b", &trace),
            ]);
            let _ = manager.init();
        }));

        assert!(result.is_err());
        // manager 在展开中被丢弃：不调用 on_exit，b 也从未进入
        assert_eq!(*trace.borrow(), vec![Call::Enter("a")]);
    }

    #[test]
    fn test_partial_init_only_exits_entered() {
        let trace = Trace::default();
        let mut manager = GimmickManager::with_gimmicks(vec![
            Recording::panicking("a", &trace),
            Recording::boxed("b", &trace),
        ]);

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = manager.init();
        }));
        assert!(result.is_err());

        manager.update(0.1).unwrap();
        manager.release().unwrap();
        assert_eq!(
            *trace.borrow(),
            vec![Call::Enter("a"), Call::Update("a", 0.1), Call::Exit("a")]
        );
    }

    #[test]
    fn test_battle_manager_order() {
        let config = GimmickConfig::default();
        let mut manager = GimmickManager::new(
            TabNotificationGimmick::new(&config),
            WindowNotificationGimmick::new(&config),
        );
        assert!(manager.is_empty());

        manager.init().unwrap();
        assert_eq!(
            manager.names(),
            vec![
                TabNotificationGimmick::NAME,
                WindowNotificationGimmick::NAME
            ]
        );
        assert!(manager.get::<TabNotificationGimmick>().unwrap().is_visible());
        assert!(manager.get::<WindowNotificationGimmick>().unwrap().is_open());
    }

    #[test]
    fn test_typed_access_before_init() {
        let config = GimmickConfig::default();
        let mut manager = GimmickManager::new(
            TabNotificationGimmick::new(&config),
            WindowNotificationGimmick::new(&config),
        );

        manager
            .get_mut::<WindowNotificationGimmick>()
            .unwrap()
            .push("queued before init");
        manager.init().unwrap();

        let window = manager.get::<WindowNotificationGimmick>().unwrap();
        assert_eq!(window.current().unwrap().message, "queued before init");
    }
}
