use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use studyhub_catalog::{Bundle, BundleOrderType, OrderDirection};
use studyhub_db::BundleFilter;

use super::{format_minutes, open_existing, truncate_str};
use crate::CliError;

const NAME_WIDTH: usize = 32;

/// Show one bundle with its courses and class totals.
pub(crate) fn run_get(db: Option<PathBuf>, id: i64) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let details = studyhub_db::bundle_details(&conn, id)
        .map_err(|e| CliError::database(format!("Failed to load bundle: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("bundle {}", id)))?;

    let bundle = &details.bundle;
    log::info!(
        "{} {}",
        format!("#{}", bundle.id()).if_supports_color(Stdout, |t| t.dimmed()),
        bundle.name().if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Price:       {:.2}", bundle.price());
    if let Some(description) = bundle.description() {
        log::info!("  Description: {}", description);
    }
    if let Some(logo) = bundle.logo() {
        log::info!("  Logo:        {}", logo);
    }
    log::info!(
        "  Classes:     {} ({})",
        details.stats.total_classes,
        format_minutes(details.stats.total_length),
    );

    crate::log_blank();
    if details.courses.is_empty() {
        log::info!("  {}", "No courses".if_supports_color(Stdout, |t| t.dimmed()));
    } else {
        log::info!("  {}", "Courses".if_supports_color(Stdout, |t| t.bold()));
        for course in &details.courses {
            log::info!(
                "    {} {}",
                format!("#{:<4}", course.id).if_supports_color(Stdout, |t| t.dimmed()),
                course.name,
            );
        }
    }
    Ok(())
}

/// List bundles with course and sales counts.
pub(crate) fn run_list(
    db: Option<PathBuf>,
    student: Option<i64>,
    limit: Option<u32>,
    prefix: String,
    order_by: Option<BundleOrderType>,
    desc: bool,
) -> Result<(), CliError> {
    let conn = open_existing(db)?;

    let mut filter = BundleFilter::default().name_prefix(prefix);
    if let Some(student) = student {
        filter = filter.for_student(student);
    }
    if let Some(n) = limit {
        filter = filter.limit(n);
    }
    if let Some(column) = order_by {
        let direction = if desc {
            OrderDirection::Descending
        } else {
            OrderDirection::Ascending
        };
        filter = filter.order_by(column, direction);
    }

    let entries = studyhub_db::list_bundles(&conn, &filter)
        .map_err(|e| CliError::database(format!("Failed to list bundles: {}", e)))?;

    if entries.is_empty() {
        log::info!("{}", "No bundles found".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    log::info!(
        "{}",
        format!(
            "{:>5}  {:<width$}  {:>8}  {:>7}  {:>5}",
            "ID",
            "Name",
            "Price",
            "Courses",
            "Sales",
            width = NAME_WIDTH,
        )
        .if_supports_color(Stdout, |t| t.bold()),
    );
    for entry in &entries {
        let bundle = &entry.bundle;
        let line = format!(
            "{:>5}  {:<width$}  {:>8.2}  {:>7}  {:>5}",
            bundle.id(),
            truncate_str(bundle.name(), NAME_WIDTH),
            bundle.price(),
            entry.courses,
            entry.sales,
            width = NAME_WIDTH,
        );
        match entry.has_bundle {
            Some(true) => log::info!(
                "{} {}",
                line,
                "owned".if_supports_color(Stdout, |t| t.green()),
            ),
            _ => log::info!("{}", line),
        }
    }
    crate::log_blank();
    log::info!(
        "{}",
        format!("{} bundle(s)", entries.len()).if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}

/// Bundles containing every course of bundle `id`.
pub(crate) fn run_extensions(
    db: Option<PathBuf>,
    id: i64,
    student: Option<i64>,
) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let bundles = studyhub_db::extension_bundles(&conn, id, student)
        .map_err(|e| CliError::database(format!("Failed to find extensions: {}", e)))?;
    print_related(&format!("Extensions of bundle #{}", id), &bundles);
    Ok(())
}

/// Bundles sharing no course with bundle `id`.
pub(crate) fn run_unrelated(
    db: Option<PathBuf>,
    id: i64,
    student: Option<i64>,
) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let bundles = studyhub_db::unrelated_bundles(&conn, id, student)
        .map_err(|e| CliError::database(format!("Failed to find unrelated bundles: {}", e)))?;
    print_related(&format!("Bundles unrelated to #{}", id), &bundles);
    Ok(())
}

pub(crate) fn run_classes(db: Option<PathBuf>, id: i64) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let stats = studyhub_db::count_total_classes(&conn, id)
        .map_err(|e| CliError::database(format!("Failed to count classes: {}", e)))?;
    log::info!(
        "Bundle #{}: {} class(es), {}",
        id,
        stats.total_classes,
        format_minutes(stats.total_length),
    );
    Ok(())
}

pub(crate) fn run_total(db: Option<PathBuf>) -> Result<(), CliError> {
    let conn = open_existing(db)?;
    let total = studyhub_db::total_bundles(&conn)
        .map_err(|e| CliError::database(format!("Failed to count bundles: {}", e)))?;
    log::info!("{}", total);
    Ok(())
}

fn print_related(title: &str, bundles: &[Bundle]) {
    log::info!("{}", title.if_supports_color(Stdout, |t| t.bold()));
    if bundles.is_empty() {
        log::info!("  {}", "none".if_supports_color(Stdout, |t| t.dimmed()));
        return;
    }
    for bundle in bundles {
        log::info!(
            "  {} {} {}",
            format!("#{:<4}", bundle.id()).if_supports_color(Stdout, |t| t.dimmed()),
            truncate_str(bundle.name(), NAME_WIDTH),
            format!("{:.2}", bundle.price()).if_supports_color(Stdout, |t| t.cyan()),
        );
    }
}
