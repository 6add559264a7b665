//! Shell command - interactive explorer session
//!
//! Reads one command per line, resolves its first word through the
//! [`ActionRegistry`] (names or configured aliases) and runs it against an
//! [`ExplorerSession`]. Rows are the 1-based numbers printed by `tree`.
//!
//! Disk operations finish in the background; their reports are printed between
//! commands as they arrive. A failed operation leaves the tree as it was drawn,
//! so the alert suggests `refresh` to re-read the affected folders. Ctrl-C during
//! `open`, `search` or `refresh` cancels the walk and keeps the previous tree.

use super::CommandContext;
use super::export::report_summary;
use crate::ExplorerError;
use crate::keybinds::{ActionRegistry, ExplorerAction, KeybindConfig, generate_help_text};
use crate::model::{NodeId, OperationReport, ReportReceiver};
use crate::output::{format_path, render_model};
use crate::session::{BuildSummary, ExplorerSession};
use crate::tree::NodeKind;
use crate::ui::Dialog;
use crate::ui::dialog::parse_paths;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, ExplorerError>;

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Execute the interactive shell on stdin
///
/// # Errors
/// Returns an error if stdin cannot be read
pub async fn execute(ctx: &CommandContext<'_>, dialog: Arc<dyn Dialog>, paths: Vec<PathBuf>) -> Result<()> {
    let (session, reports) = ExplorerSession::new(Arc::clone(ctx.gateway), dialog, ctx.config);
    let mut shell = Shell::new(ctx, session, reports);

    if !paths.is_empty()
        && let Err(err) = shell.open(Some(paths)).await
    {
        ctx.output.error(&err.to_string());
    }
    if !ctx.config.quiet {
        ctx.output.info("Type `help` for commands.");
    }

    shell.run(BufReader::new(tokio::io::stdin()), true).await
}

/// Line-oriented front end over an [`ExplorerSession`]
pub struct Shell<'a> {
    ctx: &'a CommandContext<'a>,
    keybinds: KeybindConfig,
    session: ExplorerSession,
    reports: ReportReceiver,
}

impl<'a> Shell<'a> {
    #[must_use]
    pub fn new(ctx: &'a CommandContext<'a>, session: ExplorerSession, reports: ReportReceiver) -> Self {
        Self {
            ctx,
            keybinds: ctx.config.keybinds.clone(),
            session,
            reports,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &ExplorerSession {
        &self.session
    }

    /// Read commands until `quit` or end of input, then wait for pending
    /// operations and print their reports
    ///
    /// # Errors
    /// Returns an error if reading `input` fails
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R, prompt: bool) -> Result<()> {
        let mut lines = input.lines();
        let mut show_prompt = prompt;

        loop {
            if show_prompt {
                print!("fsx> ");
                std::io::stdout().flush()?;
                show_prompt = false;
            }

            tokio::select! {
                Some(report) = self.reports.recv() => self.report(&report),
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    show_prompt = prompt;
                    match self.handle(&line).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(err) => self.ctx.output.error(&err.to_string()),
                    }
                }
            }
        }

        let Self { session, mut reports, ctx, .. } = self;
        let pending = session.status().in_flight;
        if pending > 0 {
            ctx.output.info(&format!("waiting for {pending} pending operation(s)"));
        }
        drop(session);
        while let Some(report) = reports.recv().await {
            print_report(ctx, &report);
        }
        Ok(())
    }

    fn report(&self, report: &OperationReport) {
        print_report(self.ctx, report);
    }

    /// Run one command line
    ///
    /// # Errors
    /// Returns an error for unknown commands, bad arguments or a failed command
    pub async fn handle(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(Flow::Continue);
        };
        let action = ActionRegistry::resolve(word, &self.keybinds).ok_or_else(|| {
            ExplorerError::InvalidInput(format!("unknown command '{word}' (type `help`)"))
        })?;
        let args: Vec<&str> = rest.split_whitespace().collect();
        debug!(?action, rest, "shell command");

        match action {
            ExplorerAction::Open => {
                let paths = parse_paths(rest);
                self.open((!paths.is_empty()).then_some(paths)).await?;
            }
            ExplorerAction::Show => self.show(),
            ExplorerAction::Refresh => {
                let watcher = self.watch_interrupt();
                let summary = self.session.refresh().await;
                watcher.abort();
                self.built(&summary?);
            }
            ExplorerAction::Reveal => {
                let id = self.row(&args, 0)?;
                let shown = self.session.reveal(id)?;
                self.ctx.output.info(&format!("opened {}", self.path(&shown)));
            }
            ExplorerAction::Search => {
                let watcher = self.watch_interrupt();
                let summary = self.session.search(rest).await;
                watcher.abort();
                self.built(&summary?);
            }
            ExplorerAction::Criteria => self.criteria(&args)?,
            ExplorerAction::Area => {
                self.session.set_search_area(parse_paths(rest));
                let area: Vec<String> = self.session.search_area().iter().map(|p| self.path(p)).collect();
                self.ctx.output.info(&format!("search area: {}", area.join(", ")));
            }
            ExplorerAction::Select | ExplorerAction::Deselect => {
                let id = self.row(&args, 0)?;
                self.session.set_selected(id, action == ExplorerAction::Select)?;
                self.show();
            }
            ExplorerAction::Toggle => {
                let id = self.row(&args, 0)?;
                self.session.toggle_selected(id)?;
                self.show();
            }
            ExplorerAction::Expand | ExplorerAction::Collapse => {
                let id = self.row(&args, 0)?;
                self.session.set_expanded(id, action == ExplorerAction::Expand)?;
                self.show();
            }
            ExplorerAction::Export => {
                let destination = parse_paths(rest).into_iter().next();
                match self.session.export(destination).await? {
                    Some(summary) => report_summary(self.ctx, &summary),
                    None => self.ctx.output.info("export cancelled"),
                }
            }
            ExplorerAction::New => self.create(&args)?,
            ExplorerAction::Delete => {
                let id = self.row(&args, 0)?;
                let label = self.label(id)?;
                let op = self.session.delete(id)?;
                self.ctx.output.success(&format!("{op} deleting {label}"));
            }
            ExplorerAction::Copy => {
                let id = self.row(&args, 0)?;
                self.session.copy(id)?;
                self.ctx.output.info(&format!("copied {}", self.label(id)?));
            }
            ExplorerAction::Cut => {
                let id = self.row(&args, 0)?;
                self.session.cut(id)?;
                self.ctx.output.info(&format!("cut {}", self.label(id)?));
            }
            ExplorerAction::Paste => {
                let destination = self.row(&args, 0)?;
                let (id, op) = self.session.paste(destination).await?;
                self.ctx.output.success(&format!("{op} pasting {}", self.label(id)?));
            }
            ExplorerAction::Drag => {
                let id = self.row(&args, 0)?;
                let target = self.row(&args, 1)?;
                let label = self.label(id)?;
                let op = self.session.drag(id, target).await?;
                self.ctx.output.success(&format!("{op} moving {label}"));
            }
            ExplorerAction::Status => self.status(),
            ExplorerAction::Help => self.ctx.output.write(generate_help_text(&self.keybinds).trim_end()),
            ExplorerAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn open(&mut self, paths: Option<Vec<PathBuf>>) -> Result<()> {
        let watcher = self.watch_interrupt();
        let opened = self.session.open(paths).await;
        watcher.abort();
        match opened? {
            Some(summary) => self.built(&summary),
            None => self.ctx.output.info("open cancelled"),
        }
        Ok(())
    }

    /// Cancel the session's next tree build on Ctrl-C
    ///
    /// Abort the returned task once the build is over.
    fn watch_interrupt(&mut self) -> JoinHandle<()> {
        let token = self.session.cancellation();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling walk");
                token.cancel();
            }
        })
    }

    fn built(&self, summary: &BuildSummary) {
        self.ctx.warn_failures(&summary.failures);
        if let Some(notice) = summary.notice {
            self.ctx.output.info(&notice.to_string());
            return;
        }
        self.show();
    }

    fn show(&self) {
        let model = self.session.model();
        if model.is_empty() {
            self.ctx.output.info("nothing open (use `open <path>`)");
            return;
        }
        self.ctx
            .output
            .write(render_model(model, self.ctx.style.numbered(true)).trim_end());
    }

    fn criteria(&mut self, args: &[&str]) -> Result<()> {
        if !args.is_empty() {
            let (mut name, mut ext, mut content) = (false, false, false);
            for arg in args {
                match arg.to_lowercase().as_str() {
                    "name" | "n" => name = true,
                    "ext" | "extension" | "e" => ext = true,
                    "content" | "c" => content = true,
                    "none" => {}
                    other => {
                        return Err(ExplorerError::InvalidInput(format!(
                            "unknown criterion '{other}' (use name, ext, content)"
                        )));
                    }
                }
            }
            self.session.set_criteria(name, ext, content);
        }

        let current = self.session.criteria();
        let active: Vec<&str> = [
            (current.match_name, "name"),
            (current.match_extension, "ext"),
            (current.match_content, "content"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();
        let active = if active.is_empty() { "none".to_string() } else { active.join(", ") };
        self.ctx.output.info(&format!("criteria: {active}"));
        Ok(())
    }

    fn create(&mut self, args: &[&str]) -> Result<()> {
        let kind = match args.first().map(|k| k.to_lowercase()) {
            Some(k) if k == "file" || k == "f" => Some(NodeKind::File),
            Some(k) if k == "folder" || k == "dir" || k == "d" => Some(NodeKind::Folder),
            _ => None,
        };
        let parent = self.row(args, 1)?;
        let name = args.get(2..).map(|words| words.join(" ")).unwrap_or_default();

        let (id, op) = self.session.create(parent, &name, kind)?;
        self.ctx.output.success(&format!("{op} creating {}", self.label(id)?));
        Ok(())
    }

    fn status(&self) {
        let status = self.session.status();
        let out = self.ctx.output;
        let list = |paths: &[PathBuf]| {
            if paths.is_empty() {
                "-".to_string()
            } else {
                paths.iter().map(|p| self.path(p)).collect::<Vec<_>>().join(", ")
            }
        };

        out.write(&format!("roots:       {}", list(&status.roots)));
        out.write(&format!("search area: {}", list(&status.search_area)));
        if let Some(query) = &status.active_query {
            out.write(&format!("showing:     results for '{query}'"));
        }
        out.write(&format!("entries:     {} ({} selected)", status.entries, status.selected));
        match &status.clipboard {
            Some((path, mode)) => out.write(&format!("clipboard:   {} ({mode:?})", self.path(path))),
            None => out.write("clipboard:   empty"),
        }
        out.write(&format!("pending:     {}", status.in_flight));
    }

    fn row(&self, args: &[&str], index: usize) -> Result<NodeId> {
        let raw = args
            .get(index)
            .ok_or_else(|| ExplorerError::InvalidInput("missing row number".to_string()))?;
        let row = raw
            .parse::<usize>()
            .map_err(|_| ExplorerError::InvalidInput(format!("'{raw}' is not a row number")))?;
        self.session.node_at(row)
    }

    fn label(&self, id: NodeId) -> Result<String> {
        Ok(self.path(self.session.path_of(id)?))
    }

    fn path(&self, path: &std::path::Path) -> String {
        format_path(path, self.ctx.style.path_format)
    }
}

fn print_report(ctx: &CommandContext<'_>, report: &OperationReport) {
    let Some(alert) = report.alert() else {
        debug!(id = %report.id, "operation finished");
        return;
    };
    warn!(id = %report.id, %alert, "operation failed");
    ctx.output.error(&format!("{} {alert}", report.id));
    if !report.reconcile.is_empty() {
        let folders: Vec<String> = report
            .reconcile
            .iter()
            .map(|p| format_path(p, ctx.style.path_format))
            .collect();
        ctx.output.warning(&format!(
            "the tree may be out of date for {}; run `refresh`",
            folders.join(", ")
        ));
    }
}

/// First word and the remainder of a line
fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::gateway::{FileSystemGateway, GatewayOp, MemoryGateway};
    use crate::output::TreeStyle;
    use crate::ui::{BufferedWriter, MessageLevel, MockDialog};

    fn memory() -> Arc<MemoryGateway> {
        Arc::new(
            MemoryGateway::new()
                .with_file("/w/docs/a.txt", "alpha")
                .with_file("/w/notes.md", "TODO"),
        )
    }

    async fn script(memory: Arc<MemoryGateway>, input: &str) -> BufferedWriter {
        colored::control::set_override(false);
        let gateway: Arc<dyn FileSystemGateway> = memory;
        let config = ExplorerConfig::default();
        let out = BufferedWriter::new();
        let ctx = CommandContext {
            gateway: &gateway,
            config: &config,
            style: TreeStyle::default(),
            output: &out,
        };
        let (session, reports) =
            ExplorerSession::new(Arc::clone(&gateway), Arc::new(MockDialog::cancelled().saving_to("/out")), &config);
        let shell = Shell::new(&ctx, session, reports);
        shell.run(input.as_bytes(), false).await.unwrap();
        out
    }

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("search  big report "), Some(("search", "big report")));
        assert_eq!(split_word("tree"), Some(("tree", "")));
        assert_eq!(split_word(""), None);
    }

    #[tokio::test]
    async fn test_open_prints_numbered_tree() {
        let out = script(memory(), "open /w\n").await;
        let printed = out.at_level(MessageLevel::Normal).join("\n");
        let lines: Vec<&str> = printed.lines().collect();

        assert_eq!(lines[0], "1 ▾ [ ] /w/");
        assert_eq!(lines[1], "2   ▾ [ ] docs/");
        assert_eq!(lines[3], "4     [ ] notes.md");
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_running() {
        let out = script(memory(), "frobnicate\nopen /w\n").await;
        assert!(out.at_level(MessageLevel::Error)[0].contains("unknown command 'frobnicate'"));
        assert!(!out.at_level(MessageLevel::Normal).is_empty());
    }

    #[tokio::test]
    async fn test_create_and_delete_reach_disk() {
        let memory = memory();
        script(memory.clone(), "open /w\nnew folder 2 inbox\nrm 3\nquit\n").await;

        assert!(memory.is_dir("/w/docs/inbox"));
        assert!(!memory.exists("/w/docs/a.txt"));
    }

    #[tokio::test]
    async fn test_new_without_kind_is_rejected() {
        let memory = memory();
        let out = script(memory.clone(), "open /w\nnew thing 2 inbox\n").await;
        assert!(!out.at_level(MessageLevel::Error).is_empty());
        assert!(!memory.exists("/w/docs/inbox"));
    }

    #[tokio::test]
    async fn test_paste_and_drag() {
        let memory = memory();
        // rows: 1 /w, 2 docs, 3 a.txt, 4 notes.md
        script(memory.clone(), "open /w\ncp 4\np 2\nmv 3 1\n").await;

        assert_eq!(memory.read_string("/w/docs/notes.md").as_deref(), Some("TODO"));
        assert!(memory.exists("/w/a.txt"));
        assert!(!memory.exists("/w/docs/a.txt"));
    }

    #[tokio::test]
    async fn test_failed_operation_is_reported() {
        let memory = memory();
        memory.fail_on(GatewayOp::DeleteFile, "/w/notes.md");
        let out = script(memory.clone(), "open /w\ndelete 4\n").await;

        let errors = out.at_level(MessageLevel::Error);
        assert!(errors.iter().any(|e| e.contains("delete failed")));
        assert!(out.at_level(MessageLevel::Warning)[0].contains("refresh"));
        assert!(memory.exists("/w/notes.md"));
    }

    #[tokio::test]
    async fn test_search_and_export_selection() {
        let memory = memory();
        let out = script(memory.clone(), "open /w\ncriteria content\nsearch todo\nselect 1\nexport\n").await;

        assert!(out.at_level(MessageLevel::Info).contains(&"criteria: content".to_string()));
        assert_eq!(memory.read_string("/out/notes.md").as_deref(), Some("TODO"));
        assert_eq!(out.at_level(MessageLevel::Success).len(), 1);
    }

    #[tokio::test]
    async fn test_collapse_hides_rows() {
        let out = script(memory(), "open /w\ncollapse 2\n").await;
        let last = out.at_level(MessageLevel::Normal).pop().unwrap();
        assert!(last.contains("▸ [ ] docs/"));
        assert!(!last.contains("a.txt"));
    }
}
