//! `compile` command: one compilation pass over the resolved directories.

use crate::compiler::{self, CompilePlan};
use crate::config::ProjectConfig;
use crate::log;
use crate::resource;
use anyhow::Result;

pub fn run(config: &ProjectConfig) -> Result<()> {
    log!("compile"; "compiling Sass templates");

    let locations =
        resource::resolve_all(&config.compile.resources, &config.compile.fallback_spec())?;
    if locations.is_empty() {
        log!("compile"; "no stylesheet directories resolved, nothing to do");
        return Ok(());
    }

    let plan = CompilePlan::new(&config.compile, locations)?;
    compiler::compile(&plan, config.compile.fail_on_error)
}
