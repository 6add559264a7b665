//! Tree command - print the tree of one or more paths

use super::CommandContext;
use crate::ExplorerError;
use crate::output::{self, render_nodes};
use crate::tree::TreeBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type Result<T> = std::result::Result<T, ExplorerError>;

/// Execute the tree command
///
/// # Errors
/// Returns an error if none of the paths can be read or JSON output fails
pub async fn execute(
    ctx: &CommandContext<'_>,
    paths: &[PathBuf],
    json: bool,
    cancel: CancellationToken,
) -> Result<()> {
    let built = TreeBuilder::new(Arc::clone(ctx.gateway))
        .with_options(ctx.config.walk.clone())
        .with_cancellation(cancel)
        .build(paths)
        .await?;

    ctx.warn_failures(&built.failures);
    if json {
        ctx.output.write(&output::to_json(&built.nodes)?);
    } else {
        ctx.output.write(render_nodes(&built.nodes, ctx.style).trim_end());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::gateway::{FileSystemGateway, MemoryGateway};
    use crate::output::TreeStyle;
    use crate::ui::{BufferedWriter, MessageLevel};

    fn gateway() -> Arc<dyn FileSystemGateway> {
        Arc::new(
            MemoryGateway::new()
                .with_file("/w/src/main.rs", "fn main() {}")
                .with_file("/w/README.md", "# w"),
        )
    }

    #[tokio::test]
    async fn test_prints_tree() {
        colored::control::set_override(false);
        let gateway = gateway();
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        execute(&ctx, &["/w".into()], false, CancellationToken::new())
            .await
            .unwrap();

        let printed = out.at_level(MessageLevel::Normal).join("\n");
        assert!(printed.starts_with("▾ [ ] /w/"));
        assert!(printed.contains("main.rs"));
    }

    #[tokio::test]
    async fn test_json_and_partial_failure() {
        let gateway = gateway();
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        execute(&ctx, &["/w/README.md".into(), "/missing".into()], true, CancellationToken::new())
            .await
            .unwrap();

        let printed = out.at_level(MessageLevel::Normal).join("\n");
        assert!(printed.contains("\"name\": \"README.md\""));
        assert_eq!(out.at_level(MessageLevel::Warning).len(), 1);
    }

    #[tokio::test]
    async fn test_all_roots_missing_is_an_error() {
        let gateway = gateway();
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };

        let result = execute(&ctx, &["/missing".into()], false, CancellationToken::new()).await;
        assert!(matches!(result, Err(ExplorerError::Tree(_))));
    }
}
