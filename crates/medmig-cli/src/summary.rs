use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use medmig_cli::logging::{REDACTED_VALUE, log_data_enabled};
use medmig_cli::types::{CrudStep, MigrationResult, SourceCheck};
use medmig_validate::{Issue, ValidationReport};

pub fn print_migration_summary(result: &MigrationResult) {
    println!("Source: {}", result.source.display());
    println!("Target: {}", result.namespace);
    if result.dry_run {
        println!("Dry run: nothing was written");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Source rows"), Cell::new(result.rows)]);
    table.add_row(vec![
        Cell::new("Pre-migration issues"),
        count_cell(Some(result.pre.issues.len()), Color::Red),
    ]);

    let transformed = result.pre.is_valid();
    table.add_row(vec![
        Cell::new("Patient documents"),
        optional_cell(transformed.then_some(result.documents)),
    ]);
    table.add_row(vec![
        Cell::new("Admissions"),
        optional_cell(transformed.then_some(result.admissions)),
    ]);
    table.add_row(vec![
        Cell::new("Demographic conflicts"),
        count_cell(transformed.then_some(result.conflicts.len()), Color::Yellow),
    ]);

    let load = result.load.as_ref();
    table.add_row(vec![
        Cell::new(match load {
            Some(summary) => format!("Written ({})", summary.mode),
            None => "Written".to_string(),
        }),
        optional_cell(load.map(|summary| summary.written)),
    ]);
    table.add_row(vec![
        Cell::new("  inserted"),
        optional_cell(load.map(|summary| summary.inserted)),
    ]);
    table.add_row(vec![
        Cell::new("  replaced"),
        optional_cell(load.map(|summary| summary.replaced)),
    ]);
    table.add_row(vec![
        Cell::new("  removed"),
        optional_cell(load.map(|summary| summary.removed)),
    ]);
    table.add_row(vec![
        Cell::new("Post-migration issues"),
        count_cell(
            result.post.as_ref().map(|post| post.issues.len()),
            Color::Red,
        ),
    ]);
    println!("{table}");

    if let Some(summary) = load
        && !summary.indexes.is_empty()
    {
        println!("Indexes: {}", summary.indexes.join(", "));
    }
    print_issue_table(&result.pre);
    if let Some(post) = &result.post {
        print_issue_table(post);
    }
    if result.has_errors() {
        eprintln!("Migration failed validation.");
    } else if !result.dry_run {
        println!("Migration completed.");
    }
}

pub fn print_source_check(check: &SourceCheck) {
    println!("Source: {}", check.source.display());
    println!("Rows: {}", check.rows);
    if !check.unrecognized_columns.is_empty() {
        println!(
            "Unrecognized columns: {}",
            check.unrecognized_columns.join(", ")
        );
    }
    if check.report.is_valid() {
        println!("Pre-migration validation passed.");
    } else {
        print_issue_table(&check.report);
    }
}

pub fn print_crud_steps(steps: &[CrudStep]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Operation"),
        header_cell("Outcome"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, step) in steps.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(step.operation)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&step.outcome),
        ]);
    }
    println!("{table}");
}

fn print_issue_table(report: &ValidationReport) {
    if report.issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Count"),
        header_cell("Message"),
        header_cell("Examples"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for issue in &report.issues {
        table.add_row(vec![
            Cell::new(issue.kind()).fg(Color::Red),
            match issue.count() {
                Some(count) => Cell::new(count).fg(Color::Red),
                None => dim_cell("-"),
            },
            Cell::new(issue.headline()),
            example_cell(issue),
        ]);
    }
    println!();
    println!("{} issues:", capitalize(report.stage.label()));
    println!("{table}");
}

/// Duplicate and collision samples name patients.
fn example_cell(issue: &Issue) -> Cell {
    let samples = issue.samples();
    if samples.is_empty() {
        return dim_cell("-");
    }
    let names_patients = matches!(
        issue,
        Issue::DuplicatePatients { .. } | Issue::IdentityCollisions { .. }
    );
    if names_patients && !log_data_enabled() {
        dim_cell(REDACTED_VALUE)
    } else {
        Cell::new(samples.join(", "))
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn optional_cell(value: Option<usize>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(22)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
