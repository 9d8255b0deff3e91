//! Colored terminal preview of a palette.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::color::Color;
use crate::theme::{Role, SemanticPalette};

const SWATCH: &str = "      ";

fn term(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Write the semantic roles as labelled swatches, then the terminal slots as
/// two rows of eight.
pub fn write_preview(out: &mut impl Write, palette: &SemanticPalette) -> io::Result<()> {
    let roles = palette.roles();
    for role in [
        Role::Background,
        Role::Text,
        Role::Primary,
        Role::Secondary,
        Role::Accent,
    ] {
        let color = palette.get(role);
        queue!(
            out,
            SetBackgroundColor(term(color)),
            Print(SWATCH),
            ResetColor,
            Print(format!(" {:<10} {color}\n", role.name())),
        )?;
    }

    queue!(out, Print("\n"))?;
    for row in roles.terminal.chunks(8) {
        for &color in row {
            queue!(
                out,
                SetBackgroundColor(term(roles.background)),
                SetForegroundColor(term(color)),
                Print(" ███ "),
            )?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }

    queue!(
        out,
        SetBackgroundColor(term(roles.background)),
        SetForegroundColor(term(roles.text)),
        Print(format!(
            " {} · contrast {:.2}:1 · quality {:.2} ",
            palette.method(),
            palette.text_contrast(),
            palette.quality().total
        )),
        ResetColor,
        Print("\n"),
    )?;
    out.flush()
}

/// Preview on stdout.
pub fn print_preview(palette: &SemanticPalette) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_preview(&mut lock, palette)
}
