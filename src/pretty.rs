//! # Terminal rendering
//!
//! Coloured output for ideas, scripts and status lines, written with
//! crossterm attribute commands. Every function takes any [`Write`] so the
//! same code renders to stdout or to an in-memory buffer.
//!
//! | Element | Style |
//! |---------|-------|
//! | Banners and card titles | bold cyan |
//! | Script timing markers (`[0-3 seconds] HOOK:`) | yellow |
//! | Section labels | bold |
//! | Hashtags | magenta |
//! | Success / warning lines | green / yellow |

use crossterm::{
    ExecutableCommand,
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
};
use std::io::{self, Write};

use crate::idea::VideoIdea;

fn styled<W: Write>(out: &mut W, color: Color, bold: bool, text: &str) -> io::Result<()> {
    out.execute(SetForegroundColor(color))?;
    if bold {
        out.execute(SetAttribute(Attribute::Bold))?;
    }
    write!(out, "{text}")?;
    out.execute(SetAttribute(Attribute::Reset))?;
    out.execute(SetForegroundColor(Color::Reset))?;
    Ok(())
}

fn label<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.execute(SetAttribute(Attribute::Bold))?;
    write!(out, "{text}")?;
    out.execute(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// A `=`-ruled banner.
pub fn print_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(70);
    writeln!(out, "\n{rule}")?;
    styled(out, Color::Cyan, true, title)?;
    writeln!(out, "\n{rule}")?;
    Ok(())
}

pub fn print_success<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    styled(out, Color::Green, false, "✓ ")?;
    writeln!(out, "{message}")
}

pub fn print_warning<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    styled(out, Color::Yellow, false, "! ")?;
    writeln!(out, "{message}")
}

/// Renders one idea as a card.
pub fn print_idea<W: Write>(out: &mut W, index: usize, idea: &VideoIdea) -> io::Result<()> {
    let rule = "━".repeat(50);

    writeln!(out)?;
    styled(out, Color::Cyan, true, &format!("#{index} {}", idea.title))?;
    writeln!(out, "\n{rule}")?;

    label(out, "Platform: ")?;
    writeln!(out, "{} ({})", idea.platform.display_name(), idea.duration)?;
    label(out, "Audience: ")?;
    writeln!(out, "{}", idea.target_audience)?;

    label(out, "Hook: ")?;
    writeln!(out, "{}", idea.hook)?;

    label(out, "Key points:")?;
    writeln!(out)?;
    for point in &idea.key_points {
        writeln!(out, "  • {point}")?;
    }

    label(out, "CTA: ")?;
    writeln!(out, "{}", idea.cta)?;

    styled(out, Color::Magenta, false, &idea.hashtags.join(" "))?;
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    Ok(())
}

pub fn print_ideas<W: Write>(out: &mut W, ideas: &[VideoIdea]) -> io::Result<()> {
    for (i, idea) in ideas.iter().enumerate() {
        print_idea(out, i + 1, idea)?;
    }
    out.flush()
}

/// Prints a formatted script, highlighting its headings and timing markers.
pub fn print_script<W: Write>(out: &mut W, script: &str) -> io::Result<()> {
    for line in script.lines() {
        if line.starts_with("SCRIPT #") {
            styled(out, Color::Cyan, true, line)?;
        } else if line.starts_with('[') && line.contains("seconds]") {
            styled(out, Color::Yellow, true, line)?;
        } else if let Some(tags) = line.strip_prefix("HASHTAGS: ") {
            label(out, "HASHTAGS: ")?;
            styled(out, Color::Magenta, false, tags)?;
        } else if line.ends_with(':') && line.chars().all(|c| !c.is_lowercase()) {
            label(out, line)?;
        } else {
            write!(out, "{line}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Plain text with upper-case `HEADINGS:` highlighted. Used for listings.
pub fn print_listing<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| !c.is_lowercase()) && trimmed.ends_with(':')
        {
            styled(out, Color::Cyan, true, line)?;
        } else {
            write!(out, "{line}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}
