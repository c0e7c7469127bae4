//! Convert command - turn an OpenShift template into a Helm chart
//!
//! Controllers, services and routes are folded into `values.yaml`, the
//! remaining objects become templates and parameters become values.

use console::{Style, StyledObject, style};
use std::collections::HashMap;
use std::path::Path;
use tpl2helm_convert::{
    ConversionResult, ConversionWarning, ConvertOptions, WarningCategory, WarningSeverity,
    convert_with_options,
};

use crate::error::Result;

/// Report order of the warning groups
const CATEGORY_ORDER: [(WarningCategory, &str, &str); 5] = [
    (WarningCategory::Volume, "Volumes", "review mounts"),
    (WarningCategory::Controller, "Controller", "review extracted settings"),
    (WarningCategory::Parameter, "Parameters", "values to provide"),
    (WarningCategory::Values, "Values", "keys left out"),
    (WarningCategory::DroppedKind, "Dropped", "not carried into the chart"),
];

pub fn run(template_path: &Path, output_dir: &Path, options: ConvertOptions) -> Result<()> {
    let dry_run = options.dry_run;
    let verbose = options.verbose;

    print_header(template_path, output_dir);

    let result = convert_with_options(template_path, output_dir, options)?;

    print_files(&result, output_dir, dry_run);
    print_warnings(&result, verbose);
    print_summary(&result);
    print_next_steps(&result, dry_run);

    Ok(())
}

fn print_header(template_path: &Path, output_dir: &Path) {
    println!();
    println!(
        "  {} {} {}",
        style("tpl2helm").bold().cyan(),
        style("─").dim(),
        style("OpenShift → Helm").dim()
    );
    println!();
    println!(
        "  {} {} {}",
        style("Source:").dim(),
        style(template_path.display()).cyan(),
        style("(OpenShift template)").dim()
    );
    println!(
        "  {} {} {}",
        style("Target:").dim(),
        style(output_dir.display()).green(),
        style("(Helm chart)").dim()
    );
    println!();
}

fn print_files(result: &ConversionResult, output_dir: &Path, dry_run: bool) {
    let title = if dry_run { "Planned Files" } else { "Generated Files" };
    println!("  {}", style(title).bold());
    println!("  {}", style("─".repeat(title.len())).dim());

    for file in &result.files {
        let rel_path = file.strip_prefix(output_dir).unwrap_or(file);
        let mark = if dry_run {
            style("○").yellow()
        } else {
            style("✓").green().bold()
        };
        println!("  {} {}", mark, rel_path.display());
    }

    println!();
}

fn print_warnings(result: &ConversionResult, verbose: bool) {
    if result.warnings.is_empty() {
        return;
    }

    // Group warnings by category
    let mut by_category: HashMap<WarningCategory, Vec<&ConversionWarning>> = HashMap::new();
    for warning in &result.warnings {
        if warning.severity == WarningSeverity::Info && !verbose {
            continue;
        }
        by_category
            .entry(warning.category)
            .or_default()
            .push(warning);
    }

    let info_count = result
        .warnings
        .iter()
        .filter(|w| w.severity == WarningSeverity::Info)
        .count();

    if by_category.is_empty() {
        println!(
            "  {} {} {} {}",
            style("ℹ").cyan(),
            info_count,
            style("objects left out of the chart").dim(),
            style("(use --verbose to see details)").dim()
        );
        println!();
        return;
    }

    println!("  {}", style("Conversion Notes").bold());
    println!("  {}", style("────────────────").dim());
    println!();

    for (category, title, hint) in CATEGORY_ORDER {
        let Some(warnings) = by_category.get(&category) else {
            continue;
        };
        println!(
            "  {} {}",
            style(title).yellow().bold(),
            style(format!("─ {}", hint)).dim()
        );
        for warning in warnings {
            print_warning(warning);
        }
        println!();
    }
}

fn print_warning(warning: &ConversionWarning) {
    println!(
        "    {} {} {}",
        severity_icon(warning.severity),
        style(&warning.pattern).bold(),
        style(format!("in {}", warning.subject)).dim()
    );

    // Show message on next line, indented
    println!("      {}", style(&warning.message).dim());

    if let Some(ref suggestion) = warning.suggestion {
        println!("      {} {}", style("→").green(), suggestion);
    }
}

fn severity_icon(severity: WarningSeverity) -> StyledObject<&'static str> {
    Style::from_dotted_str(severity.color()).apply_to(severity.icon())
}

fn count(result: &ConversionResult, severity: WarningSeverity) -> usize {
    result
        .warnings
        .iter()
        .filter(|w| w.severity == severity)
        .count()
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn print_summary(result: &ConversionResult) {
    let unsupported_count = count(result, WarningSeverity::Unsupported);
    let warning_count = count(result, WarningSeverity::Warning);

    println!("  {}", style("Summary").bold());
    println!("  {}", style("───────").dim());

    println!(
        "  {} {} object{} read",
        style(format!("{:>3}", result.object_count)).green().bold(),
        style("template").dim(),
        plural(result.object_count)
    );
    println!(
        "  {} {} converted to values",
        style(format!("{:>3}", result.parameter_count)).blue().bold(),
        style(format!("parameter{}", plural(result.parameter_count))).dim()
    );

    if unsupported_count > 0 {
        println!(
            "  {} unsupported construct{} {}",
            style(format!("{:>3}", unsupported_count)).magenta().bold(),
            plural(unsupported_count),
            style("(needs manual fix)").dim()
        );
    }

    if warning_count > 0 {
        println!(
            "  {} warning{} {}",
            style(format!("{:>3}", warning_count)).yellow().bold(),
            plural(warning_count),
            style("(review recommended)").dim()
        );
    }

    println!();
}

fn print_next_steps(result: &ConversionResult, dry_run: bool) {
    if dry_run {
        println!(
            "  {} {}",
            style("ℹ").cyan(),
            style("Dry run mode - no files were written").dim()
        );
        println!();
        return;
    }

    let chart_dir = result.chart_dir.display();

    println!("  {}", style("Next Steps").bold());
    println!("  {}", style("──────────").dim());
    println!(
        "  {} {}",
        style("1.").dim(),
        style(format!("helm dependency update {}", chart_dir)).cyan()
    );
    println!("     {}", style("Fetch the shared application chart").dim());
    println!();
    println!(
        "  {} {}",
        style("2.").dim(),
        style(format!("helm lint {}", chart_dir)).cyan()
    );
    println!(
        "     {}",
        style("Fill in values marked TODO before installing").dim()
    );
    println!();
}
