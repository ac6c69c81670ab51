//! 儀表板報表示例
//!
//! 用法：`cargo run --example dashboard_report [settings.json]`

use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use pcp::{
    telemetry, AbcSummary, DemandInput, PlanningService, ProductionOrderInput, Repositories,
    Settings, SkuInput,
};

fn main() -> anyhow::Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_json_file(&path)
            .with_context(|| format!("載入設定失敗: {}", path))?,
        None => Settings::default(),
    };
    telemetry::init_tracing(&settings.log_level, settings.log_json)?;

    let service = PlanningService::from_settings(Repositories::in_memory(), &settings)?;

    println!("=== 生產控制儀表板示例 ===\n");

    // 主檔
    let panel = service
        .skus()
        .create(&SkuInput::new("PNL-001", "太陽能面板", "pc"))?;
    let frame = service
        .skus()
        .create(&SkuInput::new("FRM-001", "鋁框", "pc"))?;

    // 2024 年 7 月完成兩批面板，8 月初完成一批鋁框
    let batches = [
        (&panel, 100, 95, Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0)),
        (&panel, 50, 50, Utc.with_ymd_and_hms(2024, 7, 20, 9, 0, 0)),
        (&frame, 40, 38, Utc.with_ymd_and_hms(2024, 8, 2, 16, 0, 0)),
    ];
    for (sku, quantity, delivered, end) in batches {
        let end = end.single().context("無效的完成時間")?;
        let order = service
            .orders()
            .create(&ProductionOrderInput::new(sku.id, quantity))?;
        service.orders().start(&order.id, end - Duration::hours(4))?;
        service.orders().complete(&order.id, delivered, end)?;
    }
    service
        .orders()
        .create(&ProductionOrderInput::new(frame.id, 120).with_notes("等待排程"))?;

    service
        .demands()
        .create(&DemandInput::new(panel.id, "2024-07", 250))?;
    service
        .demands()
        .create(&DemandInput::new(frame.id, "2024-08", 300))?;

    println!("需求進度:");
    for row in service.demand_progress()? {
        println!(
            "  - {} {}: {}/{} ({}%)",
            row.demand.month_year,
            row.sku_code,
            row.produced_quantity,
            row.demand.target_quantity,
            row.progress_percentage.round_dp(1)
        );
    }

    let ranking = service.abc_classification()?;
    println!("\nABC 分類:");
    for item in &ranking {
        println!(
            "  - {} [{}] 產出 {}，佔比 {}%，累計 {}%",
            item.sku_code,
            item.abc_category,
            item.total_produced,
            item.percentage_of_total.round_dp(1),
            item.cumulative_percentage.round_dp(1)
        );
    }
    let abc = AbcSummary::from_ranking(&ranking);
    println!("  A/B/C = {}/{}/{}", abc.a_count, abc.b_count, abc.c_count);

    let now = Utc
        .with_ymd_and_hms(2024, 8, 15, 0, 0, 0)
        .single()
        .context("無效的報表時間")?;
    let summary = service.dashboard(now)?;
    println!("\n儀表板（{}）:", now.date_naive());
    println!("  SKU 總數: {}", summary.total_skus);
    println!("  開立訂單: {}", summary.open_orders);
    println!("  進行中訂單: {}", summary.in_progress_orders);
    println!("  緊急需求: {}", summary.critical_demands);
    for month in &summary.monthly_production {
        println!(
            "  {} {}: 產出 {} / 目標 {}",
            month.month, month.label, month.produced_units, month.target_units
        );
    }

    println!("\n{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
