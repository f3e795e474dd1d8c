//! Interactive mode: pick games, confirm, and uninstall them with progress.
//!
//! The session is line oriented. The catalog stays immutable; the session
//! only tracks which catalog indices are selected and which are visible under
//! the current filter. Deletion runs on a background worker and the
//! foreground loop renders its progress events.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::stdout_error;
use crate::catalog::{Catalog, Game};
use crate::error::{Result, UninstallerError};
use crate::library;
use crate::logging::Logger;
use crate::size::{SizeMode, estimate_reclaimable, format_playtime, format_size};
use crate::uninstall::{BatchEvent, UninstallSummary, Uninstaller};

/// Games listed by name on the confirmation screen.
const CONFIRM_PREVIEW_LIMIT: usize = 20;

const HELP: &str = "Commands: <rows> toggle (e.g. 3 or 1,4-6) | a select all | n select none | \
                    /text filter | / clear filter | d uninstall selected | q quit";

/// Something the user asked for at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Toggle the given visible rows (0-based)
    Toggle(Vec<usize>),
    SelectAll,
    SelectNone,
    Filter(String),
    ClearFilter,
    Proceed,
    Quit,
    Help,
}

/// Parse one prompt line. `rows` is the number of visible rows.
pub(crate) fn parse_action(line: &str, rows: usize) -> Result<Action> {
    let line = line.trim();
    if let Some(filter) = line.strip_prefix('/') {
        let filter = filter.trim();
        return Ok(if filter.is_empty() {
            Action::ClearFilter
        } else {
            Action::Filter(filter.to_string())
        });
    }

    match line.to_ascii_lowercase().as_str() {
        "a" | "all" => Ok(Action::SelectAll),
        "n" | "none" => Ok(Action::SelectNone),
        "d" | "done" | "uninstall" => Ok(Action::Proceed),
        "q" | "quit" | "exit" => Ok(Action::Quit),
        "" | "?" | "h" | "help" => Ok(Action::Help),
        _ => parse_rows(line, rows).map(Action::Toggle),
    }
}

/// Parse a row selection such as `3`, `1,4-6` or `2 5` into 0-based rows.
///
/// Rows are 1-based in the input and must lie within `1..=rows`. Duplicates
/// are removed; the order of first appearance is kept.
pub fn parse_rows(selection: &str, rows: usize) -> Result<Vec<usize>> {
    let mut picked = Vec::new();

    for part in selection.split([',', ' ']).filter(|p| !p.trim().is_empty()) {
        let part = part.trim();
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_row(a, rows)?, parse_row(b, rows)?),
            None => {
                let row = parse_row(part, rows)?;
                (row, row)
            }
        };
        if start > end {
            return Err(UninstallerError::InvalidSelection(format!(
                "range '{part}' is reversed"
            )));
        }
        for row in start..=end {
            if !picked.contains(&(row - 1)) {
                picked.push(row - 1);
            }
        }
    }

    if picked.is_empty() {
        return Err(UninstallerError::InvalidSelection(
            "no rows given".to_string(),
        ));
    }
    Ok(picked)
}

fn parse_row(text: &str, rows: usize) -> Result<usize> {
    let row: usize = text.trim().parse().map_err(|_| {
        UninstallerError::InvalidSelection(format!("'{}' is not a row number", text.trim()))
    })?;
    if row == 0 || row > rows {
        return Err(UninstallerError::InvalidSelection(format!(
            "row {row} is out of range (1-{rows})"
        )));
    }
    Ok(row)
}

/// Interactive selection state over an immutable catalog.
pub struct Session<'a> {
    catalog: &'a Catalog,
    dry_run: bool,
    size_mode: SizeMode,
    verbose: u8,
    quiet: bool,
    /// Selected catalog indices
    selected: BTreeSet<usize>,
    /// Catalog indices shown under the current filter
    visible: Vec<usize>,
    filter: String,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog, dry_run: bool, size_mode: SizeMode) -> Self {
        Self {
            catalog,
            dry_run,
            size_mode,
            verbose: 0,
            quiet: false,
            selected: BTreeSet::new(),
            visible: (0..catalog.len()).collect(),
            filter: String::new(),
        }
    }

    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Selected games in catalog order.
    pub fn selected_games(&self) -> Vec<Game> {
        self.selected
            .iter()
            .map(|&i| self.catalog.games()[i].clone())
            .collect()
    }

    pub(crate) fn apply(&mut self, action: &Action) {
        match action {
            Action::Toggle(rows) => {
                for &row in rows {
                    let Some(&index) = self.visible.get(row) else {
                        continue;
                    };
                    if !self.selected.remove(&index) {
                        self.selected.insert(index);
                    }
                }
            }
            Action::SelectAll => self.selected.extend(self.visible.iter().copied()),
            Action::SelectNone => self.selected.clear(),
            Action::Filter(text) => {
                self.filter = text.clone();
                self.visible = self.catalog.filter(text);
            }
            Action::ClearFilter => {
                self.filter.clear();
                self.visible = (0..self.catalog.len()).collect();
            }
            Action::Proceed | Action::Quit | Action::Help => {}
        }
    }

    /// Run the prompt loop until the user quits or a batch completes.
    pub fn run(mut self, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
        let log = Logger::new(self.verbose, self.quiet);

        if !self.dry_run && library::is_steam_running() {
            log.warn("Steam is running. Consider closing it first for cleaner uninstall.");
        }

        if self.catalog.is_empty() {
            writeln!(output, "No Steam games found!").map_err(stdout_error)?;
            return Ok(());
        }

        let mut show_table = true;
        loop {
            if show_table {
                self.write_table(output).map_err(stdout_error)?;
                show_table = false;
            }
            self.write_selection_info(output).map_err(stdout_error)?;

            let Some(line) = prompt(input, output, "> ")? else {
                return Ok(());
            };

            let action = match parse_action(&line, self.visible.len()) {
                Ok(action) => action,
                Err(err) => {
                    writeln!(output, "{err}").map_err(stdout_error)?;
                    continue;
                }
            };

            match action {
                Action::Quit => return Ok(()),
                Action::Help => {
                    writeln!(output, "{HELP}").map_err(stdout_error)?;
                }
                Action::Proceed => {
                    if self.selected.is_empty() {
                        writeln!(output, "No games selected!").map_err(stdout_error)?;
                        continue;
                    }
                    let games = self.selected_games();
                    if self.confirm(&games, input, output)? {
                        return self.uninstall(games, output);
                    }
                    show_table = true;
                }
                other => {
                    self.apply(&other);
                    show_table = true;
                }
            }
        }
    }

    fn write_table(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "\nFound {} installed games. Select games to uninstall.",
            self.catalog.len()
        )?;
        if !self.filter.is_empty() {
            writeln!(
                out,
                "Filter: \"{}\" ({} shown)",
                self.filter,
                self.visible.len()
            )?;
        }

        let name_width = self
            .visible
            .iter()
            .map(|&i| self.catalog.games()[i].name.chars().count())
            .max()
            .unwrap_or(4)
            .clamp(4, 40);
        let home = home::home_dir();

        writeln!(
            out,
            "  {:>4}  {:3}  {:<name_width$}  {:>10}  {:>8}  {:6}  Library",
            "#", "", "Game", "Size", "Played", "Proton"
        )?;
        for (row, &index) in self.visible.iter().enumerate() {
            let game = &self.catalog.games()[index];
            let mark = if self.selected.contains(&index) { "[x]" } else { "[ ]" };
            let name: String = game.name.chars().take(name_width).collect();
            writeln!(
                out,
                "  {:>4}  {mark}  {name:<name_width$}  {:>10}  {:>8}  {:6}  {}",
                row + 1,
                format_size(game.size_on_disk),
                format_playtime(game.playtime_minutes),
                if game.has_compatdata { "Yes" } else { "No" },
                shorten_home(&game.library, home.as_deref()),
            )?;
        }
        writeln!(out, "{HELP}")
    }

    fn write_selection_info(&self, out: &mut impl Write) -> std::io::Result<()> {
        if self.selected.is_empty() {
            return Ok(());
        }
        let selected = self.selected.iter().map(|&i| &self.catalog.games()[i]);
        let total = estimate_reclaimable(selected, self.size_mode);
        let mode = if self.dry_run { "(DRY RUN) " } else { "" };
        writeln!(
            out,
            "{mode}{} games selected, {} will be freed",
            self.selected.len(),
            format_size(total)
        )
    }

    fn confirm(
        &self,
        games: &[Game],
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<bool> {
        self.write_confirmation(games, output).map_err(stdout_error)?;

        let verb = if self.dry_run { "Dry run" } else { "Uninstall" };
        let answer = prompt(input, output, &format!("{verb}? [y/N] "))?;
        Ok(answer.is_some_and(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    fn write_confirmation(&self, games: &[Game], out: &mut impl Write) -> std::io::Result<()> {
        let total = estimate_reclaimable(games, self.size_mode);
        let title = if self.dry_run {
            "Confirm Uninstallation (DRY RUN)"
        } else {
            "Confirm Uninstallation"
        };

        writeln!(out, "\n{title}")?;
        writeln!(
            out,
            "You are about to uninstall {} games, freeing approximately {}.",
            games.len(),
            format_size(total)
        )?;
        writeln!(out, "Games to remove:")?;
        for game in games.iter().take(CONFIRM_PREVIEW_LIMIT) {
            writeln!(out, "  - {} ({})", game.name, format_size(game.size_on_disk))?;
        }
        if games.len() > CONFIRM_PREVIEW_LIMIT {
            writeln!(out, "  ... and {} more", games.len() - CONFIRM_PREVIEW_LIMIT)?;
        }
        Ok(())
    }

    fn uninstall(&self, games: Vec<Game>, output: &mut impl Write) -> Result<()> {
        let header = if self.dry_run {
            "Dry run - no files will be deleted"
        } else {
            "Uninstalling games..."
        };
        writeln!(output, "\n{header}").map_err(stdout_error)?;

        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::with_draw_target(Some(games.len() as u64), ProgressDrawTarget::stderr())
        };
        progress.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        // Engine messages would tear through the progress bar unless asked for
        let uninstaller = Uninstaller::builder()
            .dry_run(self.dry_run)
            .verbose(self.verbose)
            .quiet(self.quiet || self.verbose == 0)
            .build();

        let handle = uninstaller.spawn_batch(games);
        for event in handle.events() {
            match event {
                BatchEvent::Started { index, game, .. } => {
                    progress.set_position(index as u64);
                    progress.set_message(format!("Processing: {}", game.name));
                }
                BatchEvent::Finished { index, .. } => {
                    progress.set_position(index as u64 + 1);
                }
            }
        }
        progress.finish_and_clear();

        let summary = handle.join()?;
        self.write_summary(&summary, output).map_err(stdout_error)
    }

    fn write_summary(&self, summary: &UninstallSummary, out: &mut impl Write) -> std::io::Result<()> {
        for result in &summary.results {
            match &result.error {
                None => writeln!(
                    out,
                    "OK {} ({})",
                    result.game.name,
                    format_size(result.bytes_freed)
                )?,
                Some(failure) => writeln!(out, "FAILED {}: {failure}", result.game.name)?,
            }
        }

        let title = match (summary.all_successful(), self.dry_run) {
            (true, false) => "Uninstallation Complete!",
            (true, true) => "Dry Run Complete!",
            (false, _) => "Uninstallation Completed with Errors",
        };
        writeln!(out, "\n{title}")?;
        writeln!(out, "Games processed: {}", summary.total_games)?;
        writeln!(out, "Successful: {}", summary.successful)?;
        writeln!(out, "Failed: {}", summary.failed)?;
        writeln!(
            out,
            "Space freed: {}{}",
            format_size(summary.total_bytes_freed),
            if self.dry_run { " (would be freed)" } else { "" }
        )
    }
}

/// Print `message` and read one line; `None` at end of input.
fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
) -> Result<Option<String>> {
    write!(output, "{message}")
        .and_then(|_| output.flush())
        .map_err(stdout_error)?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|source| UninstallerError::Io {
            path: "<stdin>".into(),
            source,
        })?;
    Ok((read > 0).then_some(line))
}

/// Replace the home directory prefix of `path` with `~`.
fn shorten_home(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
