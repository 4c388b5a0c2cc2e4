//! resolve-root command implementation

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use trackstamp_core::{find_project_root, RootLookup, WorkflowError};

use crate::context::Context;

/// Prints the project root containing `path` (default: current directory).
///
/// Only the path goes to stdout so automation can capture it.
pub fn run(ctx: &Context, path: &Path) -> Result<ExitCode> {
    match find_project_root(path, &ctx.config.marker) {
        RootLookup::Found(root) => {
            println!("{}", root.display());
            Ok(ExitCode::SUCCESS)
        }
        RootLookup::NotFound { searched_from } => Err(WorkflowError::RootNotFound {
            start: searched_from,
            marker: ctx.config.marker.clone(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use trackstamp_core::WorkflowConfig;

    #[test]
    fn test_resolve_root_from_descendant() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("MY_TRACK/ableton/sets");
        fs::create_dir_all(&nested).unwrap();
        let ctx = Context::with_config(WorkflowConfig::default());

        assert_eq!(run(&ctx, &nested).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_resolve_root_outside_project() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::with_config(WorkflowConfig::default());

        let err = run(&ctx, tmp.path()).unwrap_err();
        assert!(err.downcast_ref::<WorkflowError>().is_some());
    }
}
