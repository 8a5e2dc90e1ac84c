mod script;

use clap::{Parser, Subcommand};
use futures::executor::LocalPool;
use hq_api::{DashboardApi, FixtureBackend};
use hq_app::{
    AppError, AppResult, Dashboard, DashboardCaches, DashboardConfig, PanelKind,
    RecordingSurface, SurfaceEvent, Trace, fetch_scenarios, find_scenario, load_config, summarize,
};
use hq_core::Scenario;
use hq_viz::LifecycleState;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

use crate::script::{Step, load_script};

#[derive(Parser)]
#[command(name = "hq-cli")]
#[command(about = "HarmoniQ CLI - energy scenario dashboard driver", long_about = None)]
struct Cli {
    /// Dashboard config YAML
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Fixture directory (overrides the config)
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,
    /// Region id for the sankey endpoint (overrides the config)
    #[arg(long, global = true)]
    mrc_id: Option<u32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List scenarios known to the backend
    Scenarios,
    /// Render panels for one scenario
    Render {
        /// Scenario id or name
        scenario: String,
        /// Panels to show (defaults to all)
        #[arg(short, long, value_delimiter = ',')]
        panels: Vec<String>,
        /// Print the figures as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a scripted sequence of select/show/hide steps
    Replay {
        /// Path to the replay script YAML
        script_path: PathBuf,
    },
    /// Validate a dashboard config file
    CheckConfig {
        /// Path to the config YAML
        config_path: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HQ_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Scenarios => cmd_scenarios(&config),
        Commands::Render {
            scenario,
            panels,
            json,
        } => cmd_render(&config, &scenario, &panels, json),
        Commands::Replay { script_path } => cmd_replay(&config, &script_path),
        Commands::CheckConfig { config_path } => cmd_check_config(&config_path),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> AppResult<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &cli.fixtures {
        config.fixtures_dir = Some(dir.clone());
    }
    if let Some(mrc_id) = cli.mrc_id {
        config.mrc_id = mrc_id;
    }
    config.validate()?;
    Ok(config)
}

struct Session {
    backend: FixtureBackend,
    api: Rc<dyn DashboardApi>,
    pool: LocalPool,
    scenarios: Vec<Scenario>,
}

fn open_session(config: &DashboardConfig) -> AppResult<Session> {
    let dir = config.fixtures_dir.as_ref().ok_or_else(|| {
        AppError::Config("no fixture directory: pass --fixtures or set fixtures_dir".to_string())
    })?;
    let backend = FixtureBackend::open(dir)?;
    let api: Rc<dyn DashboardApi> = Rc::new(backend.clone());
    let mut pool = LocalPool::new();
    let scenarios = pool.run_until(fetch_scenarios(api.as_ref()))?;
    Ok(Session {
        backend,
        api,
        pool,
        scenarios,
    })
}

fn cmd_scenarios(config: &DashboardConfig) -> AppResult<()> {
    let session = open_session(config)?;
    let summaries = summarize(&session.scenarios);

    if summaries.is_empty() {
        println!("No scenarios found");
    } else {
        println!("Scenarios:");
        for s in summaries {
            println!(
                "  {} - {} ({} -> {}, {} h, {})",
                s.id, s.name, s.start, s.end, s.hours, s.weather
            );
        }
    }
    Ok(())
}

fn parse_panels(names: &[String]) -> AppResult<Vec<PanelKind>> {
    if names.is_empty() {
        return Ok(PanelKind::ALL.to_vec());
    }
    names.iter().map(|n| n.parse()).collect()
}

fn cmd_render(
    config: &DashboardConfig,
    query: &str,
    panel_names: &[String],
    json: bool,
) -> AppResult<()> {
    let panels = parse_panels(panel_names)?;
    let mut session = open_session(config)?;
    let scenario = find_scenario(&session.scenarios, query)?;

    let surface = RecordingSurface::new();
    let dashboard = Dashboard::new(
        config,
        DashboardCaches::new(Rc::clone(&session.api), config.mrc_id),
        Rc::new(surface.clone()),
        session.pool.spawner(),
    );
    for panel in &panels {
        dashboard.show(*panel);
    }
    dashboard.select(Some(scenario.clone()));
    session.pool.run_until_stalled();

    for panel in &panels {
        if let LifecycleState::Failed(err) = dashboard.panel_state(*panel) {
            return Err(AppError::Panel {
                panel: panel.name(),
                source: err,
            });
        }
    }

    if json {
        let figures: serde_json::Map<String, serde_json::Value> = panels
            .iter()
            .filter_map(|panel| {
                let target = target_for(config, *panel);
                surface.figure(target).map(|f| (panel.name().to_string(), f))
            })
            .map(|(name, figure)| serde_json::to_value(figure).map(|v| (name, v)))
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::InvalidInput(format!("Failed to encode figure: {}", e)))?;
        println!("{}", serde_json::Value::Object(figures));
        return Ok(());
    }

    println!("Scenario {} - {}", scenario.id, scenario.name);
    for panel in &panels {
        let target = target_for(config, *panel);
        match surface.figure(target) {
            Some(figure) => {
                println!("  [{}] {}", panel, figure.layout.title);
                for trace in &figure.traces {
                    println!("    {}", describe_trace(trace));
                }
            }
            None => println!("  [{}] {}", panel, dashboard.panel_state(*panel)),
        }
    }
    dashboard.shutdown();
    Ok(())
}

/// Outcome of one replayed step.
struct StepReport {
    step: Step,
    events: Vec<SurfaceEvent>,
    panels: Vec<(PanelKind, bool, LifecycleState)>,
    retry_ignored: bool,
}

/// Apply `steps` to `dashboard` in order, draining the executor after each.
fn replay_steps(
    dashboard: &Dashboard,
    surface: &RecordingSurface,
    session: &mut Session,
    steps: &[Step],
) -> AppResult<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(steps.len());
    for step in steps {
        let mut retry_ignored = false;
        match step {
            Step::Select(scenario) => {
                let scenario = find_scenario(&session.scenarios, &scenario.query())?;
                dashboard.select(Some(scenario));
            }
            Step::Clear => {
                dashboard.select(None);
            }
            Step::Show(panel) => dashboard.show(*panel),
            Step::Hide(panel) => dashboard.hide(*panel),
            Step::Retry(panel) => retry_ignored = !dashboard.retry(*panel),
        }
        session.pool.run_until_stalled();

        reports.push(StepReport {
            step: step.clone(),
            events: surface.take_events(),
            panels: PanelKind::ALL
                .iter()
                .map(|p| (*p, dashboard.is_shown(*p), dashboard.panel_state(*p)))
                .collect(),
            retry_ignored,
        });
    }
    Ok(reports)
}

fn cmd_replay(config: &DashboardConfig, script_path: &Path) -> AppResult<()> {
    let script = load_script(script_path)?;
    let mut session = open_session(config)?;

    let surface = RecordingSurface::new();
    let dashboard = Dashboard::new(
        config,
        DashboardCaches::new(Rc::clone(&session.api), config.mrc_id),
        Rc::new(surface.clone()),
        session.pool.spawner(),
    );
    let reports = replay_steps(&dashboard, &surface, &mut session, &script.steps)?;

    for (i, report) in reports.iter().enumerate() {
        println!("{:>3}. {:?}", i + 1, report.step);
        if report.retry_ignored {
            println!("       (not failed, retry ignored)");
        }
        for event in &report.events {
            match event {
                SurfaceEvent::Plot { target, figure } => {
                    println!("       plot  {} : {}", target, figure.layout.title)
                }
                SurfaceEvent::Purge { target } => println!("       purge {}", target),
            }
        }
        for (panel, shown, state) in &report.panels {
            println!(
                "       {:<8} {:<5} {}",
                panel.name(),
                if *shown { "shown" } else { "-" },
                state
            );
        }
    }

    let requests = session.backend.requests();
    let caches = dashboard.caches();
    println!(
        "Requests: {} temporal, {} sankey",
        requests.temporal, requests.sankey
    );
    println!(
        "Cache: temporal {} entries ({} hits), sankey {} entries ({} hits)",
        caches.temporal.len(),
        caches.temporal.stats().hits,
        caches.sankey.len(),
        caches.sankey.stats().hits
    );
    dashboard.shutdown();
    Ok(())
}

fn cmd_check_config(config_path: &Path) -> AppResult<()> {
    println!("Checking config: {}", config_path.display());
    let config = load_config(config_path)?;
    if let Some(dir) = &config.fixtures_dir {
        FixtureBackend::open(dir)?;
        println!("  fixtures: {}", dir.display());
    }
    println!("  mrc_id: {}", config.mrc_id);
    println!("  temporal panel -> {}", config.panels.temporal);
    println!("  sankey panel   -> {}", config.panels.sankey);
    println!("✓ Config is valid");
    Ok(())
}

fn target_for(config: &DashboardConfig, panel: PanelKind) -> &str {
    match panel {
        PanelKind::Temporal => &config.panels.temporal,
        PanelKind::Sankey => &config.panels.sankey,
    }
}

fn describe_trace(trace: &Trace) -> String {
    match trace {
        Trace::Scatter { x, y, .. } => {
            let peak = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            format!("{}: {} points, peak {:.2} MW", trace.kind(), x.len(), peak)
        }
        Trace::Sankey { labels, value, .. } => format!(
            "{}: {} nodes, {} links, total {:.2}",
            trace.kind(),
            labels.len(),
            value.len(),
            value.iter().sum::<f64>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hq_viz::FetchError;

    fn demos() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
    }

    fn plots(report: &StepReport) -> Vec<&str> {
        report
            .events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Plot { target, .. } => Some(target.as_str()),
                SurfaceEvent::Purge { .. } => None,
            })
            .collect()
    }

    fn purges(report: &StepReport) -> Vec<&str> {
        report
            .events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Purge { target } => Some(target.as_str()),
                SurfaceEvent::Plot { .. } => None,
            })
            .collect()
    }

    fn state(report: &StepReport, panel: PanelKind) -> &LifecycleState {
        report
            .panels
            .iter()
            .find(|(p, _, _)| *p == panel)
            .map(|(_, _, s)| s)
            .unwrap()
    }

    #[test]
    fn demo_replay_runs_end_to_end() {
        let config = load_config(&demos().join("dashboard.yaml")).unwrap();
        let script = load_script(&demos().join("replay.yaml")).unwrap();
        let mut session = open_session(&config).unwrap();

        let surface = RecordingSurface::new();
        let dashboard = Dashboard::new(
            &config,
            DashboardCaches::new(Rc::clone(&session.api), config.mrc_id),
            Rc::new(surface.clone()),
            session.pool.spawner(),
        );
        let reports = replay_steps(&dashboard, &surface, &mut session, &script.steps).unwrap();
        assert_eq!(reports.len(), 8);

        let temporal = config.panels.temporal.as_str();
        let sankey = config.panels.sankey.as_str();

        // show temporal, nothing selected yet
        assert!(reports[0].events.is_empty());
        assert_eq!(state(&reports[0], PanelKind::Temporal), &LifecycleState::Unavailable);

        // select 1: only the shown panel draws
        assert_eq!(plots(&reports[1]), vec![temporal]);
        assert!(state(&reports[1], PanelKind::Sankey).is_displayable());

        // show sankey draws from cache
        assert_eq!(plots(&reports[2]), vec![sankey]);

        // Hiver froid has no sankey data
        let mut purged = purges(&reports[3]);
        purged.sort();
        let mut expected = vec![temporal, sankey];
        expected.sort();
        assert_eq!(purged, expected);
        assert_eq!(plots(&reports[3]), vec![temporal]);
        assert_eq!(
            state(&reports[3], PanelKind::Sankey),
            &LifecycleState::Failed(FetchError::NotFound {
                what: "scenario 2".to_string()
            })
        );

        // hide temporal
        assert_eq!(purges(&reports[4]), vec![temporal]);

        // back to 1: sankey redraws from cache, temporal stays hidden
        assert_eq!(plots(&reports[5]), vec![sankey]);
        assert!(state(&reports[5], PanelKind::Temporal).is_displayable());

        // show temporal
        assert_eq!(plots(&reports[6]), vec![temporal]);

        // clear
        assert_eq!(purges(&reports[7]).len(), 2);
        assert!(surface.active_targets().is_empty());
        for (_, shown, state) in &reports[7].panels {
            assert!(*shown);
            assert_eq!(state, &LifecycleState::Unavailable);
        }

        let requests = session.backend.requests();
        assert_eq!((requests.temporal, requests.sankey), (2, 2));
    }

    #[test]
    fn retry_of_healthy_panel_is_reported() {
        let config = load_config(&demos().join("dashboard.yaml")).unwrap();
        let mut session = open_session(&config).unwrap();
        let surface = RecordingSurface::new();
        let dashboard = Dashboard::new(
            &config,
            DashboardCaches::new(Rc::clone(&session.api), config.mrc_id),
            Rc::new(surface.clone()),
            session.pool.spawner(),
        );

        let steps = [Step::Retry(PanelKind::Temporal)];
        let reports = replay_steps(&dashboard, &surface, &mut session, &steps).unwrap();
        assert!(reports[0].retry_ignored);
    }
}
