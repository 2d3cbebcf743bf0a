use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use futsal_pulse::config::Config;
use futsal_pulse::dashboard::{Dashboard, PageAccess, Session};
use futsal_pulse::filters::{DateRange, SelectionUpdate, parse_date_bound};
use futsal_pulse::injuries::InjuryFilter;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = Config::from_env();
    let dashboard = Dashboard::from_config(&config);
    let user = std::env::var("USER").unwrap_or_else(|_| "cli".to_string());
    let session = Session::authenticated(user);

    match args.first().map(String::as_str) {
        Some("matches") | None => run_matches(&dashboard, &session, &args),
        Some("match") => {
            let match_id = args.get(1).context("usage: futsal_pulse match <ID>")?;
            run_match(&dashboard, &session, match_id)
        }
        Some("injuries") => run_injuries(&dashboard, &session, &args),
        Some(other) => Err(anyhow!(
            "unknown command {other:?} (expected matches, match or injuries)"
        )),
    }
}

fn run_matches(dashboard: &Dashboard, session: &Session, args: &[String]) -> Result<()> {
    let PageAccess::Granted(page) = dashboard.performance_page(session) else {
        return Err(anyhow!("login required"));
    };
    if page.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    let range = DateRange::new(
        parse_date_bound(flag_value(args, "--from")),
        parse_date_bound(flag_value(args, "--to")),
    );
    let team = flag_value(args, "--team");
    let options = page.options(&range, team);

    println!("Dates: {} .. {}", page.min_date, page.max_date);
    println!("Teams: {}", page.teams.join(", "));
    println!("Matches: {}", options.len());
    for opt in &options {
        println!("  [{}] {}", opt.value, opt.label);
    }

    if let SelectionUpdate::Select(id) = page.reconcile(&options, flag_value(args, "--selected")) {
        println!("Selected: {id}");
    }
    Ok(())
}

fn run_match(dashboard: &Dashboard, session: &Session, match_id: &str) -> Result<()> {
    let PageAccess::Granted(page) = dashboard.performance_page(session) else {
        return Err(anyhow!("login required"));
    };
    let Some(detail) = dashboard.match_detail(&page.catalog, match_id) else {
        println!("Match {match_id} is not in the catalog.");
        return Ok(());
    };

    println!("{}", detail.title);
    for c in &detail.colors {
        println!("  {} {}", c.color, c.team_name);
    }
    println!("Timeline (attacking events only): {}", detail.table.len());
    for row in &detail.table {
        println!(
            "  {:>6}  {:<16} {:<16} {}",
            row.match_minute, row.team_name, row.description, row.player_name
        );
    }
    for d in &detail.distribution {
        println!("  {} {}: {}", d.team_name, d.description, d.count);
    }
    Ok(())
}

fn run_injuries(dashboard: &Dashboard, session: &Session, args: &[String]) -> Result<()> {
    let filter = InjuryFilter {
        start: parse_date_bound(flag_value(args, "--from")),
        end: parse_date_bound(flag_value(args, "--to")),
        player: flag_value(args, "--player").map(str::to_string),
        kind: flag_value(args, "--type").map(str::to_string),
    };
    let PageAccess::Granted(page) = dashboard.medical_page(session, &filter) else {
        return Err(anyhow!("login required"));
    };

    println!("Injuries: {}", page.table.len());
    for row in &page.table {
        println!(
            "  {}  {:<10} {:<8} {:<9} {:>3}d",
            row.date, row.player, row.kind, row.severity, row.days_out
        );
    }
    println!("By type & severity:");
    for c in &page.by_type_severity {
        println!("  {} / {}: {}", c.category, c.series, c.count);
    }
    println!("Per month:");
    for c in &page.per_month {
        println!("  {} / {}: {}", c.category, c.series, c.count);
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}
