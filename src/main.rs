//! Headless driver for the keygrid engine.
//!
//! Reads one JSON object per line from stdin and writes one JSON outcome per
//! line to stdout. This is the seam where a platform event tap and a real
//! pointer/overlay backend plug in; here both collaborators just log.
//!
//! Accepted input lines:
//!
//! ```text
//! {"key":"space","kind":"down","modifiers":{"control":true,"option":true},"timestamp_ms":0}
//! {"cursor":{"x":640.0,"y":480.0}}
//! {"displays":[{"x":0.0,"y":0.0,"width":1920.0,"height":1080.0}]}
//! ```
//!
//! Key events produce an [`Outcome`]; the other two lines update engine
//! context and produce no output.

use clap::Parser;
use keygrid::app::{OverlayAction, OverlayRenderer, PointerAction, PointerActuator};
use keygrid::domain::{Bounds, DisplayLayout, KeyEvent, Point};
use keygrid::infrastructure::expand_tilde;
use keygrid::{Config, Engine, Outcome, Verdict};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Keyboard-driven pointer control engine (stdin/stdout driver)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Display frame as x,y,width,height (repeat for several displays)
    #[arg(short, long = "display", value_name = "X,Y,W,H", value_parser = parse_bounds)]
    displays: Vec<Bounds>,

    /// Tracing filter, overrides `trace_level` from the configuration
    #[arg(long, value_name = "FILTER")]
    trace_level: Option<String>,
}

fn parse_bounds(text: &str) -> Result<Bounds, String> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => {
            let bounds = Bounds::new(*x, *y, *w, *h);
            if bounds.is_usable() {
                Ok(bounds)
            } else {
                Err("values must be finite, width and height positive".to_string())
            }
        }
        _ => Err(format!("expected x,y,width,height, got {text:?}")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Cursor { cursor: Point },
    Displays { displays: Vec<Bounds> },
    Key(KeyEvent),
}

/// Stand-in pointer backend.
struct LoggingActuator;

impl PointerActuator for LoggingActuator {
    fn perform(&mut self, action: &PointerAction) {
        tracing::info!(?action, "pointer");
    }
}

/// Stand-in overlay backend.
struct LoggingRenderer;

impl OverlayRenderer for LoggingRenderer {
    fn apply(&mut self, action: &OverlayAction) {
        match action {
            OverlayAction::Show(grid) => {
                tracing::info!(rows = grid.rows, columns = grid.columns, "overlay shown");
            }
            other => tracing::info!(action = ?other, "overlay"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(expand_tilde);
    let mut config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.trace_level.is_some() {
        config.trace_level = cli.trace_level;
    }
    keygrid::observability::init_tracing(&config);

    let displays = if cli.displays.is_empty() {
        vec![Bounds::new(0.0, 0.0, 1920.0, 1080.0)]
    } else {
        cli.displays
    };
    let mut engine = match keygrid::initialize(&config, displays) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "engine initialization failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut engine, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "driver stopped");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &mut Engine, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let mut actuator = LoggingActuator;
    let mut renderer = LoggingRenderer;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // Collaborator and driver logs are exported as events of this span.
        let _line_span = tracing::info_span!("driver_line", line = index + 1).entered();

        match serde_json::from_str::<Input>(&line) {
            Ok(Input::Key(event)) => {
                let outcome = engine.handle_event(&event);
                report(&outcome);
                outcome.dispatch(&mut actuator, &mut renderer);
                serde_json::to_writer(&mut output, &outcome)?;
                writeln!(output)?;
                output.flush()?;
            }
            Ok(Input::Cursor { cursor }) => engine.sync_cursor(cursor),
            Ok(Input::Displays { displays }) => match DisplayLayout::new(displays) {
                Some(layout) => engine.set_displays(layout),
                None => tracing::warn!("ignoring unusable display set"),
            },
            Err(e) => tracing::warn!(error = %e, "unreadable input line"),
        }
    }
    Ok(())
}

fn report(outcome: &Outcome) {
    if outcome.verdict == Verdict::ReenableSource {
        tracing::warn!("event source was disabled by the system, re-enabling");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_frames() {
        assert_eq!(
            parse_bounds("1920, 0,1280,800"),
            Ok(Bounds::new(1920.0, 0.0, 1280.0, 800.0))
        );
        assert!(parse_bounds("0,0,0,800").is_err());
        assert!(parse_bounds("0,0,800").is_err());
        assert!(parse_bounds("a,0,1,1").is_err());
        assert!(parse_bounds("NaN,0,100,100").is_err());
        assert!(parse_bounds("0,inf,100,100").is_err());
        assert!(parse_bounds("0,0,infinity,100").is_err());
    }

    #[test]
    fn driver_logs_land_in_the_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let trace_file = dir.path().join("driver.json");
        let mut engine =
            keygrid::initialize(&Config::default(), vec![Bounds::new(0.0, 0.0, 800.0, 600.0)])
                .unwrap();
        let input = [
            "{oops",
            r#"{"key":"escape","kind":"tap_disabled"}"#,
            r#"{"key":"space","kind":"down","modifiers":{"control":true,"option":true}}"#,
        ]
        .join("\n");

        let subscriber = keygrid::observability::file_subscriber(trace_file.clone(), "info");
        tracing::subscriber::with_default(subscriber, || {
            run(&mut engine, input.as_bytes(), Vec::new()).unwrap();
        });

        let text = std::fs::read_to_string(&trace_file).unwrap();
        assert!(text.contains("driver_line"));
        assert!(text.contains("unreadable input line"));
        assert!(text.contains("re-enabling"));
        assert!(text.contains("overlay shown"));
    }

    #[test]
    fn non_finite_display_line_is_ignored() {
        let mut engine =
            keygrid::initialize(&Config::default(), vec![Bounds::new(0.0, 0.0, 800.0, 600.0)])
                .unwrap();
        // serde_json cannot express NaN, so the guard is exercised on the layout directly.
        assert!(DisplayLayout::new(vec![Bounds::new(f64::NAN, 0.0, 100.0, 100.0)]).is_none());

        let input = [
            r#"{"displays":[]}"#,
            r#"{"key":"space","kind":"down","modifiers":{"control":true,"option":true}}"#,
            r#"{"key":"right","kind":"down"}"#,
        ]
        .join("\n");
        let mut out = Vec::new();
        run(&mut engine, input.as_bytes(), &mut out).unwrap();

        assert_eq!(engine.displays().main(), Bounds::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(engine.state().cursor_position(), Point::new(410.0, 300.0));
    }

    #[test]
    fn drives_engine_from_json_lines() {
        let displays = vec![Bounds::new(0.0, 0.0, 2600.0, 2600.0)];
        let mut engine = keygrid::initialize(&Config::default(), displays).unwrap();
        let input = [
            r#"{"key":"space","kind":"down","modifiers":{"control":true,"option":true},"timestamp_ms":0}"#,
            "",
            r#"{"cursor":{"x":5.0,"y":5.0}}"#,
            "not json",
            r#"{"key":"escape","kind":"down","timestamp_ms":10}"#,
        ]
        .join("\n");

        let mut out = Vec::new();
        run(&mut engine, input.as_bytes(), &mut out).unwrap();

        let outcomes: Vec<Outcome> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(Outcome::is_consumed));
        assert_eq!(engine.mode(), keygrid::Mode::Idle);
        assert_eq!(engine.state().cursor_position(), Point::new(5.0, 5.0));
    }
}
