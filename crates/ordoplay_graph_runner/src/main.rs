// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` graph runner
//!
//! Loads a serialized graph described by a RON settings file, pushes the
//! configured external values, ticks the graph and logs every external
//! slot afterwards.
//!
//! ```text
//! ordoplay_graph_runner [settings.ron]
//! ```

mod settings;

use ordoplay_graph::externals::EXTERNAL_KINDS;
use ordoplay_graph::Graph;
use settings::{RunnerSettings, SETTINGS_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(extra: Option<&str>) {
    let mut env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ordoplay_graph_runner=info"));
    for directive in extra.into_iter().flat_map(|extra| extra.split(',')) {
        match directive.trim().parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log filter directive {directive:?}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run(settings: &RunnerSettings, settings_path: &Path) -> std::io::Result<()> {
    let graph_path = settings.graph_path(settings_path);
    let text = std::fs::read_to_string(&graph_path)?;
    let mut graph = Graph::from_text(text.trim())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    graph.set_clock(settings.clock);
    graph.prepare();

    tracing::info!(
        graph = %graph_path.display(),
        nodes = graph.node_count(),
        outputs = graph.outputs().len(),
        externals = graph.externals().len(),
        "Loaded graph"
    );

    if let Some(inputs) = &settings.inputs {
        inputs
            .apply_to(&graph)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    }

    for _ in 0..settings.ticks {
        graph.process();
    }

    for ty in EXTERNAL_KINDS {
        for slot in graph.externals().slots(ty) {
            if let Ok(external) = graph.external_node(slot.node) {
                tracing::info!(slot = %slot.name, kind = %ty, value = ?external.get(), "External");
            }
        }
    }
    Ok(())
}

fn main() {
    let settings_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);

    let settings = match RunnerSettings::load(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(None);
            tracing::error!("Failed to load {}: {e}", settings_path.display());
            std::process::exit(1);
        }
    };
    init_tracing(settings.log_filter.as_deref());

    tracing::info!("Starting OrdoPlay graph runner v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&settings, &settings_path) {
        tracing::error!("Runner failed: {e}");
        std::process::exit(1);
    }
}
