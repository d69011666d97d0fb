//! Terminal rendering for the view-models
//!
//! Everything writes to a caller-supplied `Write` so output can be captured.

use crate::api::models::AdminStats;
use crate::auth::models::Identity;
use crate::views::roster::{Confirm, Page};
use std::io::{self, BufRead, Write};

pub fn identity(out: &mut impl Write, identity: &Identity) -> io::Result<()> {
    writeln!(out, "{}", identity.full_name)?;
    writeln!(out, "  Email:    {}", identity.email)?;
    writeln!(out, "  Phone:    {}", identity.phone)?;
    writeln!(out, "  Role:     {}", identity.role)?;
    if let Some(course) = identity.course.as_deref().filter(|c| !c.is_empty()) {
        writeln!(out, "  Course:   {}", course)?;
    }
    if let Some(year) = identity.enrollment_year {
        writeln!(out, "  Enrolled: {}", year)?;
    }
    if let Some(status) = identity.status {
        writeln!(out, "  Status:   {}", status)?;
    }
    Ok(())
}

/// Table of one roster page followed by the page footer
pub fn roster_page(out: &mut impl Write, page: &Page<'_>) -> io::Result<()> {
    if page.is_empty() {
        writeln!(out, "No students found")?;
    } else {
        writeln!(
            out,
            "{:<26} {:<24} {:<28} {:<20} {:<6} {:<10}",
            "ID", "NAME", "EMAIL", "COURSE", "YEAR", "STATUS"
        )?;
        for record in &page.items {
            writeln!(
                out,
                "{:<26} {:<24} {:<28} {:<20} {:<6} {:<10}",
                record.id,
                record.full_name,
                record.email,
                record.course.as_deref().unwrap_or("-"),
                record
                    .enrollment_year
                    .map_or_else(|| "-".to_string(), |y| y.to_string()),
                record.status,
            )?;
        }
    }
    writeln!(
        out,
        "Page {} of {} ({} matching)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    )
}

pub fn stats(out: &mut impl Write, stats: &AdminStats) -> io::Result<()> {
    writeln!(out, "Total students: {}", stats.total)?;
    writeln!(out, "  Active:       {}", stats.active)?;
    writeln!(out, "  Graduated:    {}", stats.graduated)?;
    writeln!(out, "  Dropped:      {}", stats.dropped)
}

pub fn notice(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message)
}

/// Confirms by asking on stdin; anything but y/yes declines
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let stdin = io::stdin();
        ask(&mut stdin.lock(), &mut io::stderr(), prompt)
    }
}

/// Confirms without asking
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

fn ask(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> bool {
    if write!(out, "{} [y/N] ", prompt).and_then(|_| out.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Read one line from stdin after printing a prompt to stderr
pub fn read_line(prompt: &str) -> io::Result<String> {
    let mut err = io::stderr();
    write!(err, "{}: ", prompt)?;
    err.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
