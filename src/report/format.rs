//! Plain-text formatting of summaries for the terminal.

use crate::report::{CameraKey, CameraYear, CrashSummary, MonthTotal, NamedCount, ViolationTotal};

pub fn format_crash_summary(summary: &CrashSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Traffic crashes ===\n");
    out.push_str(&format!(
        "Rows: {} selected of {}",
        summary.rows_selected, summary.rows_total
    ));
    if let Some(year) = summary.filter.year {
        out.push_str(&format!(" | year={year}"));
    }
    if let Some(min) = summary.filter.min_injuries {
        out.push_str(&format!(" | injuries>={min}"));
    }
    out.push('\n');

    out.push_str("\nCrashes by year:\n");
    for y in &summary.years {
        let change = match y.change_pct {
            None => String::new(),
            Some(pct) if pct.is_infinite() => "   (new)".to_string(),
            Some(pct) => format!("   {pct:+.2}%"),
        };
        out.push_str(&format!("  {:<6}{:>10}{change}\n", y.year, y.count));
    }

    out.push_str("\nCrashes by weekday:\n");
    push_named(&mut out, &summary.weekdays);

    out.push_str("\nCrashes by month:\n");
    push_named(&mut out, &summary.months);

    if !summary.injuries.is_empty() {
        out.push_str("\nInjuries:\n");
        out.push_str(&format!(
            "  {:<24}{:>10}{:>10}{:>10}{:>10}\n",
            "measure", "sum", "mean", "std", "kurt"
        ));
        for s in &summary.injuries {
            out.push_str(&format!(
                "  {:<24}{:>10.0}{:>10.4}{:>10.4}{:>10}\n",
                s.measure.display_name(),
                s.sum,
                s.mean,
                s.std_dev,
                fmt_opt(s.excess_kurtosis)
            ));
        }
    }

    out
}

pub fn format_camera_years(years: &[CameraYear]) -> String {
    let mut out = String::new();
    out.push_str("=== Red-light cameras ===\n");
    out.push_str(&format!("  {:<6}{:>14}{:>10}\n", "year", "violations", "cameras"));
    for y in years {
        out.push_str(&format!(
            "  {:<6}{:>14.0}{:>10}\n",
            y.year, y.total_violations, y.active_cameras
        ));
    }
    out
}

pub fn format_violation_ranking(key: CameraKey, ascending: bool, totals: &[ViolationTotal]) -> String {
    let what = match key {
        CameraKey::Intersection => "intersection",
        CameraKey::Camera => "camera",
    };
    let order = if ascending { "Bottom" } else { "Top" };
    let mut out = format!("\n{order} {} by {what}:\n", totals.len());
    push_totals(&mut out, totals);
    out
}

pub fn format_monthly_violations(months: &[MonthTotal]) -> String {
    let mut out = String::from("\nViolations by month:\n");
    for m in months {
        out.push_str(&format!("  {}-{:02}{:>14.0}\n", m.year, m.month, m.total));
    }
    out
}

pub fn format_weekday_violations(days: &[ViolationTotal]) -> String {
    let mut out = String::from("\nViolations by weekday:\n");
    push_totals(&mut out, days);
    out
}

fn push_totals(out: &mut String, totals: &[ViolationTotal]) {
    for t in totals {
        out.push_str(&format!("  {:<32}{:>14.0}\n", t.name, t.total));
    }
}

fn push_named(out: &mut String, counts: &[NamedCount]) {
    for c in counts {
        out.push_str(&format!("  {:<12}{:>10}\n", c.name, c.count));
    }
}

fn fmt_opt(value: f64) -> String {
    if value.is_finite() { format!("{value:.4}") } else { "-".to_string() }
}
