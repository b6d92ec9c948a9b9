use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{NOTHING, UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use obs_cli::config::Layout;
use obs_cli::pipeline::View;
use obs_model::{AgeBand, Ranking, format_age};
use obs_transform::{FilterOptions, Section, SummaryMetrics};
use polars::prelude::DataFrame;

pub fn print_report(view: &View, layout: Layout) {
    let report = &view.report;
    for field in &view.disabled_filters {
        eprintln!(
            "warning: {} filter unavailable: column missing from the data",
            field.label()
        );
    }
    if view.filtered.is_empty() {
        println!("No records match the selected filters.");
    }

    println!("{}", metrics_table(&report.metrics, layout));

    let sections: Vec<Table> = [
        ("Attendances by unit", &report.by_unit),
        ("Attendances by sex", &report.by_sex),
        ("Attendances by age band", &report.by_age_band),
        ("Top procedures", &report.by_procedure),
        ("Top professionals", &report.by_professional),
    ]
    .into_iter()
    .filter_map(|(title, section)| section_table(title, section, layout))
    .collect();

    match layout {
        Layout::Compact => {
            for table in sections {
                println!("{table}");
            }
        }
        Layout::Wide => {
            for pair in sections.chunks(2) {
                let mut row = Table::new();
                row.load_preset(NOTHING)
                    .set_content_arrangement(ContentArrangement::Disabled);
                row.add_row(pair.iter().map(|table| Cell::new(table.to_string())));
                println!("{row}");
            }
        }
    }

    if let Some(drill) = &report.drill_down {
        let title = format!("Professionals performing '{}'", drill.procedure);
        print_section(&title, &drill.professionals, layout);
    }
}

fn metrics_table(metrics: &SummaryMetrics, layout: Layout) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table, layout);
    align_column(&mut table, 1, CellAlignment::Right);

    let period = match (metrics.first_day, metrics.last_day) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "-".to_string(),
    };
    let mean_age = metrics
        .mean_age
        .map_or_else(|| "-".to_string(), |age| format!("{age:.1}"));

    table.add_row(vec![
        Cell::new("Total attendances"),
        Cell::new(metrics.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Mean age"), Cell::new(mean_age)]);
    table.add_row(vec![Cell::new("Units"), Cell::new(metrics.units)]);
    table.add_row(vec![Cell::new("Procedures"), Cell::new(metrics.procedures)]);
    table.add_row(vec![
        Cell::new("Professionals"),
        Cell::new(metrics.professionals),
    ]);
    table.add_row(vec![Cell::new("Period"), Cell::new(period)]);
    table
}

pub fn print_section(title: &str, section: &Section, layout: Layout) {
    if let Some(table) = section_table(title, section, layout) {
        println!("{table}");
    }
}

/// Table for one section; a disabled section prints a warning instead.
fn section_table(title: &str, section: &Section, layout: Layout) -> Option<Table> {
    match section {
        Ok(ranking) => Some(ranking_table(title, ranking, layout)),
        Err(err) => {
            eprintln!("warning: {title} unavailable: {err}");
            None
        }
    }
}

fn ranking_table(title: &str, ranking: &Ranking, layout: Layout) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(title), header_cell("Count")]);
    apply_table_style(&mut table, layout);
    align_column(&mut table, 1, CellAlignment::Right);

    if ranking.is_empty() {
        table.add_row(vec![dim_cell("no data"), dim_cell("-")]);
    }
    for entry in ranking.iter() {
        table.add_row(vec![Cell::new(&entry.value), count_cell(entry.count)]);
    }
    table
}

pub fn print_options(options: &FilterOptions) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Filter"), header_cell("Values")]);
    apply_table_style(&mut table, Layout::Compact);

    let period = match (options.first_day, options.last_day) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "-".to_string(),
    };
    let bands: Vec<&str> = options.age_bands.iter().map(|band| band.label()).collect();

    table.add_row(vec![Cell::new("Period"), Cell::new(period)]);
    for (label, values) in [
        ("Unit", options.units.join(", ")),
        ("Sex", options.sexes.join(", ")),
        ("Age band", bands.join(", ")),
        ("Procedure", options.procedures.join(", ")),
        ("Professional", options.professionals.join(", ")),
    ] {
        let cell = if values.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(values)
        };
        table.add_row(vec![Cell::new(label), cell]);
    }
    println!("{table}");
}

pub fn print_bands() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Band"),
        header_cell("From"),
        header_cell("Up to"),
    ]);
    apply_table_style(&mut table, Layout::Compact);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let mut lower: Option<f64> = None;
    for band in AgeBand::ALL {
        let from = lower.map_or_else(|| "0".to_string(), |bound| format!("> {}", format_age(bound)));
        let upper = band
            .upper_bound()
            .map_or_else(|| dim_cell("-"), |bound| Cell::new(format_age(bound)));
        table.add_row(vec![
            Cell::new(band.label())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(from),
            upper,
        ]);
        lower = band.upper_bound();
    }
    println!("{table}");
}

pub fn print_raw(frame: &DataFrame, total_rows: usize) {
    println!();
    println!("Raw rows ({} of {total_rows}):", frame.height());
    println!("{frame}");
}

fn apply_table_style(table: &mut Table, layout: Layout) {
    match layout {
        Layout::Wide => {
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .apply_modifier(UTF8_SOLID_INNER_BORDERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(80);
        }
        Layout::Compact => {
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(120);
        }
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
