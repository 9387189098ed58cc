mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::build`, `crate::state`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use fast3dprint_lib::build;
pub use fast3dprint_lib::export;
pub use fast3dprint_lib::generation;
pub use fast3dprint_lib::state;
pub use fast3dprint_lib::text;
pub use fast3dprint_lib::units;

use std::path::PathBuf;

use app::Fast3dApp;
use state::{AppSettings, AppState, ModeState};

/// Command line options
#[derive(Debug, Default)]
struct CliArgs {
    /// `--params <path>`: initial `ModeParams` JSON
    params: Option<PathBuf>,
    /// `--export-stl <path>`: export headlessly and exit
    export_stl: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fast3dprint=info,fast3dprint_lib=info".into()),
        )
        .init();

    let args = parse_args(std::env::args().skip(1));
    let modes = load_initial_params(&args);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let settings = AppSettings::load();
    let mut state = AppState::new(runtime.handle().clone(), settings, modes);

    if let Some(path) = args.export_stl {
        state.load_fonts_blocking();
        if let Err(e) = export::export_stl_to_file(state.scene(), &path) {
            tracing::error!("Export to {} failed: {e}", path.display());
            std::process::exit(1);
        }
        return;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Fast3dPrint")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "fast3dprint",
        native_options,
        Box::new(move |cc| Ok(Box::new(Fast3dApp::new(cc, state)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }

    // in-flight requests are abandoned on exit
    runtime.shutdown_background();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> CliArgs {
    let mut cli = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--params" => cli.params = args.next().map(PathBuf::from),
            "--export-stl" => cli.export_stl = args.next().map(PathBuf::from),
            other => tracing::warn!("Ignoring unknown argument {other}"),
        }
    }
    cli
}

fn load_initial_params(args: &CliArgs) -> ModeState {
    let Some(path) = &args.params else {
        return ModeState::default();
    };
    match ModeState::load_from(path) {
        Ok(modes) => {
            tracing::info!("Loaded parameters from {} ({:?} mode)", path.display(), modes.active());
            modes
        }
        Err(e) => {
            tracing::error!("Failed to load parameters from {}: {e}", path.display());
            ModeState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliArgs {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags() {
        let cli = args(&["--params", "p.json", "--export-stl", "out.stl"]);
        assert_eq!(cli.params, Some(PathBuf::from("p.json")));
        assert_eq!(cli.export_stl, Some(PathBuf::from("out.stl")));
    }

    #[test]
    fn missing_values_and_unknown_flags_are_ignored() {
        let cli = args(&["--verbose", "--params"]);
        assert!(cli.params.is_none());
        assert!(cli.export_stl.is_none());
    }
}
