use std::sync::mpsc;
use std::time::Duration;

use chrono::NaiveDate;
use ganttline::{
    GanttChart, GanttConfig, GanttData, GanttError, LoadContext, LoadEdge, Row, RowTarget, Task,
    ViewMode,
};

/// Demo application state.
pub struct DemoApp {
    chart: GanttChart,
}

impl DemoApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Result<Self, GanttError> {
        let today = chrono::Local::now().date_naive();
        let config = GanttConfig {
            view_mode: ViewMode::Day,
            show_left_remark: true,
            show_right_remark: true,
            load_edges: vec![LoadEdge::Left, LoadEdge::Right, LoadEdge::Bottom],
            ..Default::default()
        };
        let mut chart = GanttChart::new("demo-chart", sample_data(today), config)?;
        chart.set_load_callback(demo_loader());
        chart.scroll_to_date(today - chrono::Duration::days(4));
        Ok(Self { chart })
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("ganttline");
                ui.separator();
                let active = self.chart.config().view_mode;
                for mode in ViewMode::ALL {
                    if ui.selectable_label(active == mode, mode.label()).clicked() {
                        self.chart.set_view_mode(mode);
                    }
                }
                ui.separator();
                if ui.button("Today").clicked() {
                    let today = self.chart.today();
                    self.chart.scroll_to_date(today - chrono::Duration::days(4));
                }
                if ui.button("First row").clicked() {
                    self.chart.scroll_to_row(RowTarget::Index(0));
                }
                if ui.button("Reset loading").clicked() {
                    self.chart.reset_loading();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let rows = self.chart.data().len();
                let tasks: usize = self.chart.data().iter().map(|r| r.tasks.len()).sum();
                ui.label(format!("Rows: {rows} · Tasks: {tasks}"));
                if self.chart.is_loading() {
                    ui.separator();
                    ui.label("loading…");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "{} .. {}",
                        self.chart.timeline().start,
                        self.chart.timeline().end
                    ));
                });
            });
        });

        let frame = egui::Frame::default().fill(egui::Color32::WHITE);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ganttline::ui::show(&mut self.chart, ui);
        });
    }
}

/// A dataset shaped like real project data: plans, actuals (one still in
/// progress), dependencies in both directions, remarks, a sub-day task and
/// a leave entry.
fn sample_data(today: NaiveDate) -> GanttData {
    let day = |offset: i64| today + chrono::Duration::days(offset);

    let mut brief = Task::new("t-brief", "Project brief")
        .with_plan(day(-6), day(-4))
        .with_actual(day(-6), day(-4));
    brief.left_remark = Some("Mia".into());
    brief.right_remark = Some("done".into());

    let mut draft = Task::new("t-draft", "Outline draft")
        .with_plan(day(-3), day(-3))
        .with_actual(day(-3), day(-3))
        .with_dependencies(["t-brief"]);
    draft.plan_offset_percent = Some([0.1, 0.8]);
    draft.right_remark = Some("done".into());

    let mut requirements = Task::new("t-req", "Requirements")
        .with_plan(day(-4), day(-1))
        .with_actual(day(-4), day(-2))
        .with_dependencies(["t-brief"]);
    requirements.left_remark = Some("Sam".into());
    requirements.right_remark = Some("done".into());

    let mut design = Task::new("t-design", "UI design")
        .with_plan(day(-1), day(3))
        .with_actual(day(-1), None)
        .with_dependencies(["t-req"]);
    design.left_remark = Some("Ada".into());
    design.right_remark = Some("in progress".into());

    let mut backend = Task::new("t-backend", "Backend services")
        .with_plan(day(1), day(8))
        .with_dependencies(["t-req"]);
    backend.left_remark = Some("Kim".into());

    // review depends on a later-starting task in an earlier row, which
    // exercises the backward detour routing
    let review = Task::new("t-review", "Design review")
        .with_plan(day(0), day(1))
        .with_dependencies(["t-backend"]);

    let mut leave = Task::new("t-leave", "Annual leave").with_actual(day(4), day(5));
    leave.kind = ganttline::TaskKind::Leave;
    leave.actual_bg_color = Some(ganttline::Color::from_rgb(0xf4, 0x3f, 0x5e));

    let qa = Task::new("t-qa", "Integration QA")
        .with_plan(day(9), day(12))
        .with_dependencies(["t-backend", "t-design"]);

    vec![
        Row::new("overview", "Overview", vec![brief, draft]),
        Row::new("planning", "Planning", vec![requirements, review]),
        Row::new("design", "Design", vec![design, leave]),
        Row::new("build", "Build", vec![backend]),
        Row::new("verify", "Verify", vec![qa]),
    ]
}

/// Thread-backed loader: resolves after a short delay, serves two pages per
/// horizontal direction and one page of extra rows, then reports empty so
/// the edges exhaust.
fn demo_loader() -> ganttline::LoadCallback {
    let mut pages_left = 2u32;
    let mut pages_right = 2u32;
    let mut pages_bottom = 1u32;
    Box::new(move |edge, context| {
        let remaining = match edge {
            LoadEdge::Left => &mut pages_left,
            LoadEdge::Right => &mut pages_right,
            LoadEdge::Bottom => &mut pages_bottom,
        };
        let page = if *remaining > 0 {
            *remaining -= 1;
            Some(*remaining)
        } else {
            None
        };
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(400));
            let data = match page {
                None => Vec::new(),
                Some(_) => loaded_page(edge, context),
            };
            let _ = tx.send(Ok(data));
        });
        rx
    })
}

fn loaded_page(edge: LoadEdge, context: LoadContext) -> GanttData {
    match (edge, context) {
        (LoadEdge::Left, LoadContext::Date(min)) => {
            let start = min - chrono::Duration::days(6);
            let end = min - chrono::Duration::days(1);
            vec![Row::new(
                "overview",
                "Overview",
                vec![Task::new(
                    format!("loaded-left-{start}"),
                    "Earlier groundwork",
                )
                .with_plan(start, end)
                .with_actual(start, end)],
            )]
        }
        (LoadEdge::Right, LoadContext::Date(max)) => {
            let start = max + chrono::Duration::days(1);
            let end = max + chrono::Duration::days(5);
            vec![Row::new(
                "verify",
                "Verify",
                vec![Task::new(format!("loaded-right-{start}"), "Follow-up QA")
                    .with_plan(start, end)],
            )]
        }
        (LoadEdge::Bottom, LoadContext::RowCount(count)) => {
            let today = chrono::Local::now().date_naive();
            vec![Row::new(
                format!("extra-{count}"),
                format!("Workstream {count}"),
                vec![Task::new(format!("loaded-bottom-{count}"), "Backlog item")
                    .with_plan(today, today + chrono::Duration::days(3))],
            )]
        }
        _ => Vec::new(),
    }
}
