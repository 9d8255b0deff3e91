//! Writing rendered templates to disk and asking applications to reload.
//!
//! Rendering runs in parallel; file writes and reload commands run one
//! application at a time, in configuration order.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::PaletteError;
use crate::template::builtin::TemplateSource;
use crate::template::{RenderJob, Renderer};
use crate::theme::SemanticPalette;

/// One application the palette is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub name: String,
    pub template: TemplateSource,
    pub output: PathBuf,
    pub reload: Option<String>,
    pub reload_delay: Duration,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Render but leave files and applications alone.
    pub dry_run: bool,
    /// Skip reload commands.
    pub no_reload: bool,
    /// Restrict to these application names; empty means all enabled apps.
    pub only: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    NotConfigured,
    Skipped,
    Succeeded,
    Failed(String),
}

/// What happened to an application whose template rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub path: PathBuf,
    pub bytes: usize,
    pub written: bool,
    pub reload: ReloadOutcome,
}

#[derive(Debug)]
pub struct AppStatus {
    pub app: String,
    pub result: Result<Applied, PaletteError>,
}

impl AppStatus {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Render, write and reload every selected application.
///
/// Failures are collected per application; one broken template or
/// unwritable path never stops the rest.
pub fn apply_all(
    palette: &SemanticPalette,
    apps: &[AppTarget],
    options: &ApplyOptions,
) -> Vec<AppStatus> {
    let selected: Vec<&AppTarget> = apps
        .iter()
        .filter(|app| {
            if options.only.is_empty() {
                app.enabled
            } else {
                options.only.iter().any(|name| *name == app.name)
            }
        })
        .collect();

    let mut statuses: Vec<Option<AppStatus>> = Vec::with_capacity(selected.len());
    let mut jobs = Vec::new();
    let mut job_apps = Vec::new();
    for app in &selected {
        match load_template(&app.template) {
            Ok(source) => {
                jobs.push(RenderJob {
                    app: app.name.clone(),
                    source,
                });
                job_apps.push(statuses.len());
                statuses.push(None);
            }
            Err(err) => statuses.push(Some(AppStatus {
                app: app.name.clone(),
                result: Err(err),
            })),
        }
    }

    let renderer = Renderer::default();
    let rendered = renderer.render_batch(&jobs, palette);

    for (index, result) in job_apps.into_iter().zip(rendered) {
        let app = selected[index];
        let result = result.and_then(|text| write_and_reload(app, &text, options));
        statuses[index] = Some(AppStatus {
            app: app.name.clone(),
            result,
        });
    }

    statuses.into_iter().flatten().collect()
}

pub fn load_template(source: &TemplateSource) -> Result<String, PaletteError> {
    match source {
        TemplateSource::Builtin(text) => Ok((*text).to_string()),
        TemplateSource::File(path) => {
            let path = expand_home(path);
            std::fs::read_to_string(&path).map_err(|err| {
                PaletteError::io(format!("failed to read template {}", path.display()), err)
            })
        }
    }
}

fn write_and_reload(
    app: &AppTarget,
    text: &str,
    options: &ApplyOptions,
) -> Result<Applied, PaletteError> {
    let path = expand_home(&app.output);
    if options.dry_run {
        debug!("{}: dry run, would write {} bytes to {}", app.name, text.len(), path.display());
        return Ok(Applied {
            path,
            bytes: text.len(),
            written: false,
            reload: ReloadOutcome::Skipped,
        });
    }

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|err| {
            PaletteError::io(format!("failed to create directory {}", dir.display()), err)
        })?;
    }
    std::fs::write(&path, text)
        .map_err(|err| PaletteError::io(format!("failed to write {}", path.display()), err))?;
    info!("{}: wrote {}", app.name, path.display());

    let reload = match &app.reload {
        None => ReloadOutcome::NotConfigured,
        Some(_) if options.no_reload => ReloadOutcome::Skipped,
        Some(command) => run_reload(&app.name, command, app.reload_delay),
    };

    Ok(Applied {
        path,
        bytes: text.len(),
        written: true,
        reload,
    })
}

fn run_reload(app: &str, command: &str, delay: Duration) -> ReloadOutcome {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
    debug!("{app}: running `{command}`");
    match Command::new("sh").arg("-c").arg(command).output() {
        Ok(output) if output.status.success() => ReloadOutcome::Succeeded,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            warn!("{app}: reload failed: {message}");
            ReloadOutcome::Failed(message)
        }
        Err(err) => {
            warn!("{app}: reload could not start: {err}");
            ReloadOutcome::Failed(err.to_string())
        }
    }
}

/// Expand a leading `~` to `$HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
