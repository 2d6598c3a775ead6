use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keyglide::chars::code_point_to_char;
use keyglide::consts::{CodePoint, MAX_PROXIMITY_CHARS_SIZE, MAX_VALUE_FOR_WEIGHTING_F32};
use keyglide::{DecodeReport, DgResult, ProximityInfo};

fn show_code(c: CodePoint) -> String {
    match code_point_to_char(c) {
        Some(' ') => "␣".to_string(),
        Some(ch) if !ch.is_control() => ch.to_string(),
        _ => format!("#{}", c),
    }
}

fn show_cost(cost: f32) -> String {
    if cost >= MAX_VALUE_FOR_WEIGHTING_F32 || !cost.is_finite() {
        "-".to_string()
    } else {
        format!("{:.3}", cost)
    }
}

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_spatial_summary(info: &ProximityInfo) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    let rows = [
        ("Keys", info.key_count().to_string()),
        (
            "Keyboard",
            format!("{} x {}", info.keyboard_width(), info.keyboard_height()),
        ),
        (
            "Grid",
            format!("{} x {}", info.grid_width(), info.grid_height()),
        ),
        (
            "Cell",
            format!("{} x {}", info.cell_width(), info.cell_height()),
        ),
        (
            "Common key",
            format!(
                "{} x {}",
                info.most_common_key_width(),
                info.most_common_key_height()
            ),
        ),
        (
            "Sweet spots",
            info.has_touch_position_correction_data().to_string(),
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }
    println!("{}", table);
}

pub fn print_key_table(info: &ProximityInfo) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Key").fg(Color::Cyan),
        Cell::new("X"),
        Cell::new("Y"),
        Cell::new("W"),
        Cell::new("H"),
        Cell::new("Center"),
    ]);
    right_align(&mut table, 2..=6);

    for k in 0..info.key_count() {
        let Some((x, y, w, h)) = info.key_rect(k) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(k),
            Cell::new(show_code(info.original_code_point_of(k))).fg(Color::Cyan),
            Cell::new(x),
            Cell::new(y),
            Cell::new(w),
            Cell::new(h),
            Cell::new(format!(
                "({}, {})",
                info.key_center_x(k, keyglide::consts::NOT_A_COORDINATE, false),
                info.key_center_y(k, keyglide::consts::NOT_A_COORDINATE, false)
            )),
        ]);
    }
    println!("\n{}", table);
}

/// Proximity lists of `count` cells spread evenly over the grid.
pub fn print_proximity_sample(info: &ProximityInfo, count: usize) {
    let cells = (info.grid_width() * info.grid_height()).max(0) as usize;
    if cells == 0 || count == 0 {
        return;
    }
    let stride = (cells / count).max(1);

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Cell").add_attribute(Attribute::Bold),
        Cell::new("Center"),
        Cell::new(format!("Nearby (max {})", MAX_PROXIMITY_CHARS_SIZE)).fg(Color::Green),
    ]);

    for cell in (0..cells).step_by(stride).take(count) {
        let gx = cell as i32 % info.grid_width();
        let gy = cell as i32 / info.grid_width();
        let cx = gx * info.cell_width() + info.cell_width() / 2;
        let cy = gy * info.cell_height() + info.cell_height() / 2;
        let nearby: Vec<String> = info
            .proximity_list_at(cx, cy)
            .unwrap_or_default()
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| show_code(c))
            .collect();
        table.add_row(vec![
            Cell::new(format!("{},{}", gx, gy)),
            Cell::new(format!("({}, {})", cx, cy)),
            Cell::new(nearby.join(" ")).fg(Color::Green),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_decode_report(report: &DecodeReport) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Raw"),
        Cell::new("X"),
        Cell::new("Y"),
        Cell::new("Time"),
        Cell::new("Speed"),
        Cell::new("Skip").fg(Color::Red),
        Cell::new("Best keys").fg(Color::Green),
        Cell::new("Double"),
    ]);
    right_align(&mut table, 1..=6);

    for (i, p) in report.points.iter().enumerate() {
        let best: Vec<String> = p
            .top_keys
            .iter()
            .map(|k| format!("{} {:.2}", show_code(k.code_point), k.cost))
            .collect();
        table.add_row(vec![
            Cell::new(i),
            Cell::new(p.point.input_index),
            Cell::new(p.point.x),
            Cell::new(p.point.y),
            Cell::new(p.point.time),
            Cell::new(format!("{:.2}", p.speed_rate)),
            Cell::new(show_cost(p.skip_cost)).fg(Color::Red),
            Cell::new(best.join("  ")).fg(Color::Green),
            Cell::new(p.double_letter),
        ]);
    }
    println!("\n{}", table);

    println!(
        "📍 {} raw points -> {} samples ({} ms)",
        report.raw_points,
        report.points.len(),
        report.elapsed_ms
    );
    if !report.typed_word.is_empty() {
        println!("⌨️  Typed: {}", report.typed_word);
    }
    if !report.most_probable.is_empty() {
        println!(
            "✨ Most probable: {} (cost {:.3})",
            report.most_probable, report.cost
        );
    }
}

/// One synthesized word: how far its trace strays from the key centers and what came back.
pub struct SimulationRow {
    pub word: String,
    pub drift: f32,
    pub outcome: DgResult<DecodeReport>,
}

pub fn print_simulation_report(results: &[SimulationRow]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Word").add_attribute(Attribute::Bold),
        Cell::new("Decoded").fg(Color::Cyan),
        Cell::new("Cost"),
        Cell::new("Drift"),
        Cell::new("Raw"),
        Cell::new("Samples"),
        Cell::new("Match"),
    ]);
    right_align(&mut table, 2..=5);

    let mut hits = 0;
    for SimulationRow {
        word,
        drift,
        outcome,
    } in results
    {
        match outcome {
            Ok(report) => {
                let hit = report.most_probable == word.to_lowercase();
                if hit {
                    hits += 1;
                }
                table.add_row(vec![
                    Cell::new(word).add_attribute(Attribute::Bold),
                    Cell::new(&report.most_probable).fg(Color::Cyan),
                    Cell::new(show_cost(report.cost)),
                    Cell::new(show_cost(*drift)),
                    Cell::new(report.raw_points),
                    Cell::new(report.points.len()),
                    if hit {
                        Cell::new("✅").fg(Color::Green)
                    } else {
                        Cell::new("❌").fg(Color::Red)
                    },
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(word).add_attribute(Attribute::Bold),
                    Cell::new(e.to_string()).fg(Color::Red),
                ]);
            }
        }
    }
    println!("\n{}", table);
    println!("🎯 Exact greedy matches: {}/{}", hits, results.len());
}
