//! # 会话与更新图
//!
//! 每次调用一个 `Session`：持有范围表、样品表、同位素设置与绘图请求，
//! 以 `&mut` 传给每个事件处理函数。
//!
//! ## 更新顺序
//! 每个事件先修改主表，再按固定阶段顺序推进到不动点：
//!
//! ```text
//! 主表编辑 → RangeSync → IsotopeMerge → Validate → Assemble
//! ```
//!
//! 每个阶段只在被标记为脏时运行；表值未实际改变时不标记下游，
//! 因此一次更新不会再次触发自身。
//!
//! ## 依赖关系
//! - 被 `session/config.rs`, `commands/` 使用
//! - 使用 `session/sync.rs`, `session/table.rs`, `session/validator.rs`, `plot/assembler.rs`

use crate::error::{FieldError, Result};
use crate::models::{Cell, IsotopeKey, LayerField, PlotRequest, RangeEntry};
use crate::models::range::DEFAULT_ENERGY_STEP;
use crate::physics::engine::{PhysicsEngine, ResonanceEngine};
use crate::plot::assembler::{assemble, PlotData};
use crate::session::sync::{sync_range, RangeChange, RangeEdit, SyncOutcome};
use crate::session::table::SampleTable;
use crate::session::validator::{validate, ValidatedInput};
use std::fmt;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────
// 事件与阶段
// ─────────────────────────────────────────────────────────────

/// 用户事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// 一批范围表单元格编辑
    EditRange(Vec<RangeEdit>),
    SetDistance(f64),
    SetDelay(f64),
    SetStep(Cell),
    AddLayer,
    RemoveLayer,
    EditLayer {
        index: usize,
        field: LayerField,
        value: Cell,
    },
    SetIsotopeManual(bool),
    EditIsotope {
        key: IsotopeKey,
        value: Cell,
    },
    SetPlotRequest(PlotRequest),
    /// 请求计算绘图数据
    Submit,
}

/// 更新阶段（按执行顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    RangeSync,
    IsotopeMerge,
    Validate,
    Assemble,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::RangeSync,
        Stage::IsotopeMerge,
        Stage::Validate,
        Stage::Assemble,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::RangeSync => write!(f, "range-sync"),
            Stage::IsotopeMerge => write!(f, "isotope-merge"),
            Stage::Validate => write!(f, "validate"),
            Stage::Assemble => write!(f, "assemble"),
        }
    }
}

/// 脏标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Dirty {
    range: bool,
    isotopes: bool,
    validate: bool,
    assemble: bool,
}

impl Dirty {
    fn get(&self, stage: Stage) -> bool {
        match stage {
            Stage::RangeSync => self.range,
            Stage::IsotopeMerge => self.isotopes,
            Stage::Validate => self.validate,
            Stage::Assemble => self.assemble,
        }
    }

    fn clear(&mut self, stage: Stage) {
        match stage {
            Stage::RangeSync => self.range = false,
            Stage::IsotopeMerge => self.isotopes = false,
            Stage::Validate => self.validate = false,
            Stage::Assemble => self.assemble = false,
        }
    }
}

/// 一次事件处理的报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventReport {
    /// 实际运行的阶段
    pub stages_run: Vec<Stage>,
    /// 因优先级被丢弃的范围编辑
    pub discarded_edits: Vec<RangeEdit>,
    /// 本次事件产生的范围同步错误
    pub range_error: Option<FieldError>,
    /// 本次事件产生的编辑错误（如层索引越界）
    pub edit_error: Option<FieldError>,
}

// ─────────────────────────────────────────────────────────────
// 会话
// ─────────────────────────────────────────────────────────────

/// 会话上下文
pub struct Session {
    range: RangeEntry,
    step: Cell,
    table: SampleTable,
    manual_isotopes: bool,
    plot_request: PlotRequest,

    engine: Arc<dyn PhysicsEngine>,
    pending_range: RangeChange,
    dirty: Dirty,
    submitted: bool,

    range_error: Option<FieldError>,
    validation: std::result::Result<ValidatedInput, Vec<FieldError>>,
    plot: Option<PlotData>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Arc::new(ResonanceEngine::new()))
    }
}

impl Session {
    /// 以默认表格创建会话（1-100 eV, 16.45 m, 0.5 mm Ag）
    pub fn new(engine: Arc<dyn PhysicsEngine>) -> Self {
        let range = RangeEntry::default();
        let step = Cell::Number(DEFAULT_ENERGY_STEP);
        let table = SampleTable::default();
        let validation = validate(&range, &step, &table, false);
        Session {
            range,
            step,
            table,
            manual_isotopes: false,
            plot_request: PlotRequest::default(),
            engine,
            pending_range: RangeChange::default(),
            dirty: Dirty::default(),
            submitted: false,
            range_error: None,
            validation,
            plot: None,
        }
    }

    // ── 访问器 ──

    pub fn range(&self) -> &RangeEntry {
        &self.range
    }

    pub fn step(&self) -> &Cell {
        &self.step
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn manual_isotopes(&self) -> bool {
        self.manual_isotopes
    }

    pub fn plot_request(&self) -> &PlotRequest {
        &self.plot_request
    }

    pub fn engine(&self) -> &dyn PhysicsEngine {
        self.engine.as_ref()
    }

    /// 最近一次校验结果
    pub fn validated(&self) -> Option<&ValidatedInput> {
        self.validation.as_ref().ok()
    }

    /// 当前全部字段错误（范围同步错误 + 校验错误）
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self.range_error.iter().cloned().collect();
        if let Err(e) = &self.validation {
            errors.extend(e.iter().cloned());
        }
        errors
    }

    pub fn plot(&self) -> Option<&PlotData> {
        self.plot.as_ref()
    }

    // ── 事件处理 ──

    /// 处理一个事件并推进到不动点
    ///
    /// 字段错误不会中断会话，记录在报告与 `errors()` 中；
    /// 只有物理引擎失败等命令级错误以 `Err` 返回。
    pub fn apply(&mut self, event: Event) -> Result<EventReport> {
        let mut report = EventReport::default();
        self.apply_primary(event, &mut report);
        self.update(&mut report)?;
        Ok(report)
    }

    /// 依次处理多个事件
    pub fn apply_all(&mut self, events: impl IntoIterator<Item = Event>) -> Result<Vec<EventReport>> {
        events.into_iter().map(|e| self.apply(e)).collect()
    }

    fn apply_primary(&mut self, event: Event, report: &mut EventReport) {
        match event {
            Event::EditRange(edits) => {
                self.pending_range.merge(RangeChange {
                    edits,
                    ..Default::default()
                });
                self.dirty.range = true;
            }
            Event::SetDistance(distance_m) => {
                self.pending_range.merge(RangeChange {
                    distance_m: Some(distance_m),
                    ..Default::default()
                });
                self.dirty.range = true;
            }
            Event::SetDelay(delay_us) => {
                self.pending_range.merge(RangeChange {
                    delay_us: Some(delay_us),
                    ..Default::default()
                });
                self.dirty.range = true;
            }
            Event::SetStep(step) => {
                if step != self.step {
                    self.step = step;
                    self.dirty.validate = true;
                }
            }
            Event::AddLayer => {
                self.table.add_layer();
                self.mark_layers_dirty();
            }
            Event::RemoveLayer => {
                if self.table.remove_layer() {
                    self.mark_layers_dirty();
                }
            }
            Event::EditLayer { index, field, value } => match self.table.edit_layer(index, field, value) {
                Ok(true) => self.mark_layers_dirty(),
                Ok(false) => {}
                Err(e) => report.edit_error = Some(e),
            },
            Event::SetIsotopeManual(on) => {
                if on != self.manual_isotopes {
                    self.manual_isotopes = on;
                    self.dirty.validate = true;
                }
            }
            Event::EditIsotope { key, value } => match self.table.edit_isotope(&key, value) {
                Ok(true) => {
                    // 非手动模式下编辑被保留但不影响计算
                    if self.manual_isotopes {
                        self.dirty.validate = true;
                    }
                }
                Ok(false) => {}
                Err(e) => report.edit_error = Some(e),
            },
            Event::SetPlotRequest(request) => {
                let request = request.normalized();
                if request != self.plot_request {
                    self.plot_request = request;
                    self.dirty.assemble = true;
                }
            }
            Event::Submit => {
                self.submitted = true;
                self.dirty.assemble = true;
            }
        }
    }

    /// 样品表本身改变：同位素表需要重新派生，校验输入也已改变
    fn mark_layers_dirty(&mut self) {
        self.dirty.isotopes = true;
        self.dirty.validate = true;
    }

    /// 按阶段顺序推进脏阶段
    fn update(&mut self, report: &mut EventReport) -> Result<()> {
        for stage in Stage::ORDER {
            if !self.dirty.get(stage) {
                continue;
            }
            self.dirty.clear(stage);
            report.stages_run.push(stage);

            match stage {
                Stage::RangeSync => self.run_range_sync(report),
                Stage::IsotopeMerge => {
                    if self.table.merge_isotopes() {
                        self.dirty.validate = true;
                    }
                }
                Stage::Validate => {
                    let validation = validate(&self.range, &self.step, &self.table, self.manual_isotopes);
                    if validation != self.validation {
                        self.validation = validation;
                        self.dirty.assemble = true;
                    }
                }
                Stage::Assemble => self.run_assemble()?,
            }
        }
        Ok(())
    }

    fn run_range_sync(&mut self, report: &mut EventReport) {
        let change = std::mem::take(&mut self.pending_range);
        match sync_range(&self.range, &change) {
            Ok(SyncOutcome::Unchanged) => {
                self.range_error = None;
            }
            Ok(SyncOutcome::Updated { range, discarded }) => {
                self.range = range;
                self.range_error = None;
                report.discarded_edits = discarded;
                self.dirty.validate = true;
            }
            Err(e) => {
                // 表保持不变，下游不更新
                self.range_error = Some(e.clone());
                report.range_error = Some(e);
            }
        }
    }

    fn run_assemble(&mut self) -> Result<()> {
        if !self.submitted {
            return Ok(());
        }
        self.plot = match &self.validation {
            Ok(input) => Some(assemble(self.engine.as_ref(), input, &self.plot_request)?),
            Err(_) => None,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Endpoint, RangeField, YAxis};
    use crate::physics::engine::{Entity, Quantity};

    #[test]
    fn test_default_session_is_valid() {
        let session = Session::default();
        assert!(session.validated().is_some());
        assert!(session.errors().is_empty());
        assert!(session.plot().is_none());
    }

    #[test]
    fn test_submit_scenario_attenuation() {
        let mut session = Session::default();
        session.apply(Event::SetDistance(16.45)).unwrap();
        let report = session.apply(Event::Submit).unwrap();
        assert_eq!(report.stages_run, vec![Stage::Assemble]);

        let plot = session.plot().unwrap();
        assert_eq!(plot.request.y_axis, YAxis::Attenuation);
        let transmission = session
            .engine()
            .compute(&plot.energy_ev, &session.validated().unwrap().stack, Quantity::Transmission)
            .unwrap();
        let total_t = transmission.iter().find(|s| s.entity == Entity::Total).unwrap();
        let total_a = plot.displayed()[0];
        for (a, t) in total_a.values.iter().zip(&total_t.values) {
            assert!((a - (1.0 - t)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stage_order_for_layer_edit() {
        let mut session = Session::default();
        let report = session
            .apply(Event::EditLayer {
                index: 0,
                field: LayerField::Thickness,
                value: Cell::from(1.0),
            })
            .unwrap();
        assert_eq!(report.stages_run, vec![Stage::IsotopeMerge, Stage::Validate, Stage::Assemble]);
    }

    #[test]
    fn test_unchanged_isotope_merge_does_not_revalidate() {
        let mut session = Session::default();
        session.dirty.isotopes = true;
        let mut report = EventReport::default();
        session.update(&mut report).unwrap();
        assert_eq!(report.stages_run, vec![Stage::IsotopeMerge]);
    }

    #[test]
    fn test_whitespace_formula_edit_keeps_isotope_table() {
        let mut session = Session::default();
        let before = session.table().isotopes().clone();
        let report = session
            .apply(Event::EditLayer {
                index: 0,
                field: LayerField::Formula,
                value: Cell::from("Ag "),
            })
            .unwrap();
        assert_eq!(&report.stages_run[..2], &[Stage::IsotopeMerge, Stage::Validate]);
        assert_eq!(session.table().isotopes(), &before);
        assert!(session.validated().is_some());
    }

    #[test]
    fn test_unchanged_range_does_not_revalidate() {
        let mut session = Session::default();
        let report = session
            .apply(Event::EditRange(vec![RangeEdit::new(Endpoint::Min, RangeField::Energy, 1.0)]))
            .unwrap();
        assert_eq!(report.stages_run, vec![Stage::RangeSync]);
    }

    #[test]
    fn test_range_error_leaves_table_and_plot() {
        let mut session = Session::default();
        session.apply(Event::Submit).unwrap();
        let before_range = session.range().clone();
        let before_plot = session.plot().cloned();

        let report = session.apply(Event::SetDistance(-1.0)).unwrap();
        assert!(report.range_error.is_some());
        assert_eq!(session.range(), &before_range);
        assert_eq!(session.plot().cloned(), before_plot);
        assert_eq!(session.errors().len(), 1);

        session.apply(Event::SetDistance(20.0)).unwrap();
        assert!(session.errors().is_empty());
        assert_eq!(session.range().distance_m, 20.0);
    }

    #[test]
    fn test_invalid_input_clears_plot() {
        let mut session = Session::default();
        session.apply(Event::Submit).unwrap();
        assert!(session.plot().is_some());

        session
            .apply(Event::EditLayer {
                index: 0,
                field: LayerField::Formula,
                value: Cell::from("AgCl"),
            })
            .unwrap();
        assert!(session.plot().is_none());
        assert!(session.errors()[0].message.contains("Density required"));
    }

    #[test]
    fn test_add_remove_layer_round_trip() {
        let mut session = Session::default();
        let before = session.table().clone();
        session.apply(Event::AddLayer).unwrap();
        assert_eq!(session.table().len(), 2);
        assert!(session.validated().is_none(), "blank layer is invalid");
        session.apply(Event::RemoveLayer).unwrap();
        assert_eq!(session.table(), &before);
        assert!(session.validated().is_some());
    }

    #[test]
    fn test_edit_error_reported() {
        let mut session = Session::default();
        let report = session
            .apply(Event::EditLayer {
                index: 3,
                field: LayerField::Density,
                value: Cell::from(1.0),
            })
            .unwrap();
        assert!(report.edit_error.is_some());
        assert!(report.stages_run.is_empty());
    }

    #[test]
    fn test_isotope_edit_only_matters_when_manual() {
        let mut session = Session::default();
        let key = IsotopeKey::new(0, "Ag", "107-Ag");
        let report = session
            .apply(Event::EditIsotope {
                key: key.clone(),
                value: Cell::from(1.0),
            })
            .unwrap();
        assert!(report.stages_run.is_empty());

        session.apply(Event::SetIsotopeManual(true)).unwrap();
        assert!(session.validated().is_none(), "107 + 109 now sum above one");

        session
            .apply(Event::EditIsotope {
                key: IsotopeKey::new(0, "Ag", "109-Ag"),
                value: Cell::from(0.0),
            })
            .unwrap();
        assert!(session.validated().is_some());
    }
}
