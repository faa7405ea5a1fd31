//! Compile plan construction and execution.
//!
//! The resolver's ordered pair sequence becomes a [`CompilePlan`]: the first
//! pair is the primary template/css location, the remaining pairs are
//! additional locations appended after it. The plan renders to one argument
//! vector for the external compiler and is executed through the shared
//! command runner, with output mapped to [`events::CompilerEvents`].

pub mod events;

use crate::config::compile::CompileConfig;
use crate::log;
use crate::resource::Location;
use crate::utils::exec::Cmd;
use crate::utils::path::to_unix_separators;
use anyhow::{Result, bail};
use events::CompilerEvents;
use std::path::PathBuf;

/// A fully resolved compiler invocation.
#[derive(Debug, Clone)]
pub struct CompilePlan {
    /// Primary template/css location (first resolved pair).
    primary: Location,
    /// Additional locations, in resolution order.
    additional: Vec<Location>,
    /// Compiler executable and leading arguments.
    command: Vec<String>,
    /// Output style flag.
    style: OutputStyle,
    /// Whether to emit source maps.
    source_map: bool,
    /// Extra import load paths.
    load_paths: Vec<PathBuf>,
}

/// Compiler output style.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl OutputStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }
}

impl CompilePlan {
    /// Build a plan from the resolved locations.
    ///
    /// `locations` must be non-empty; the caller handles the nothing-resolved
    /// case before building a plan.
    pub fn new(config: &CompileConfig, locations: Vec<Location>) -> Result<Self> {
        let mut iter = locations.into_iter();
        let Some(primary) = iter.next() else {
            bail!("cannot build a compile plan without stylesheet directories");
        };

        Ok(Self {
            primary,
            additional: iter.collect(),
            command: config.command.clone(),
            style: config.style,
            source_map: config.source_map,
            load_paths: config.load_paths.clone(),
        })
    }

    /// The primary template/css location.
    pub fn primary(&self) -> &Location {
        &self.primary
    }

    /// Every location in plan order, primary first.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        std::iter::once(&self.primary).chain(self.additional.iter())
    }

    /// Source roots to watch, in plan order.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        self.locations()
            .map(|(source, _)| PathBuf::from(source))
            .collect()
    }

    /// Render the compiler argument vector.
    ///
    /// Option flags first, then the `source:destination` pairs with the
    /// primary location leading.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        args.push(format!("--style={}", self.style.as_str()));
        if !self.source_map {
            args.push("--no-source-map".to_string());
        }
        for load_path in &self.load_paths {
            args.push(format!("--load-path={}", to_unix_separators(load_path)));
        }

        for (source, destination) in self.locations() {
            args.push(format!("{source}:{destination}"));
        }

        args
    }

    /// Run the compiler once, reporting events.
    ///
    /// Returns the event sink so the caller can apply its failure policy.
    pub fn run_once(&self) -> Result<CompilerEvents> {
        let mut events = CompilerEvents::new();
        let output = Cmd::from_slice(&self.command)
            .args(self.to_args())
            .capture()?;

        events.report_stdout(&String::from_utf8_lossy(&output.stdout));
        if !output.status.success() {
            events.report_stderr(&String::from_utf8_lossy(&output.stderr));
        } else {
            // successful runs may still print deprecation warnings on stderr
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                log!("sass"; "{stderr}");
            }
        }

        Ok(events)
    }
}

/// Execute one compile pass and apply the fail-on-error policy.
pub fn compile(plan: &CompilePlan, fail_on_error: bool) -> Result<()> {
    let events = plan.run_once()?;

    if events.had_error() {
        if fail_on_error {
            bail!("Sass compilation encountered errors (see above for details)");
        }
        log!("warning"; "Sass compilation encountered errors, continuing (fail_on_error = false)");
    }

    Ok(())
}
