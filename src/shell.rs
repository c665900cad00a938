//! Terminal screens for the timer: running view, completion prompt and the
//! month calendar. Rendering is a pure function of the state handed in.

use std::io::Write;

use anyhow::{bail, Result};
use chrono::Datelike;
use tokio::{io::AsyncBufRead, io::AsyncBufReadExt, sync::broadcast::error::RecvError};

use crate::{
    calendar::{DayDetail, MonthView},
    completion::{CompletionCapture, NOTE_MAX_CHARS},
    flow::ReadingFlow,
    models::{CompletionReceipt, ReadingRecord},
    timer::{TimerEvent, TimerSnapshot, TimerStatus, PRESET_MINUTES},
    utils::format_duration,
};

const BAR_WIDTH: usize = 20;
const RUNNING_HELP: &str = "commands: p = pause, r = resume, x = stop";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Saved(CompletionReceipt),
    Skipped,
    Cancelled,
}

pub fn render_selection(selected_minutes: u32) -> String {
    let options: Vec<String> = PRESET_MINUTES
        .iter()
        .map(|m| {
            if *m == selected_minutes {
                format!("[{m} min]")
            } else {
                format!(" {m} min ")
            }
        })
        .collect();
    format!("Choose how long to read: {}", options.join(" "))
}

pub fn render_running(snapshot: &TimerSnapshot) -> String {
    let filled = ((snapshot.progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let status = match snapshot.state.status {
        TimerStatus::Paused => "paused ",
        TimerStatus::Completed => "done   ",
        _ => "reading",
    };
    format!(
        "{} [{}{}] {:>3.0}% {}",
        snapshot.clock,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        snapshot.progress,
        status
    )
}

pub fn render_capture(capture: &CompletionCapture) -> String {
    let book = capture
        .book()
        .map(|b| format!(" with \"{}\" by {}", b.title, b.author))
        .unwrap_or_default();
    format!(
        "Reading complete! {} min{}.",
        capture.duration_minutes(),
        book
    )
}

pub fn render_month(view: &MonthView) -> String {
    let mut out = String::new();
    let first = view.cells.iter().find(|c| c.in_month).map(|c| c.date);
    if let Some(first) = first {
        out.push_str(&format!("{}\n", first.format("%B %Y")));
    }
    out.push_str("Su  Mo  Tu  We  Th  Fr  Sa\n");
    for week in view.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                if !cell.in_month {
                    return "   ".to_string();
                }
                let mark = match cell.intensity {
                    i if i >= 1.0 => '#',
                    i if i >= 0.5 => '+',
                    i if i > 0.0 => '.',
                    _ if cell.is_today => '<',
                    _ => ' ',
                };
                format!("{:>2}{}", cell.date.day(), mark)
            })
            .collect();
        out.push_str(row.join(" ").trim_end());
        out.push('\n');
    }
    let stats = &view.stats;
    out.push_str(&format!(
        "days read: {}  sessions: {}  total: {} ({:.1}h)\n",
        stats.reading_days,
        stats.sessions,
        format_duration(stats.total_minutes),
        stats.total_hours()
    ));
    if stats.sessions == 0 {
        out.push_str("No reading recorded this month yet.\n");
    }
    out
}

pub fn render_day(detail: &DayDetail) -> String {
    let mut out = format!("{}\n", detail.date.format("%A, %B %-d %Y"));
    if detail.entries.is_empty() {
        out.push_str("No reading recorded on this day.\n");
        return out;
    }
    out.push_str(&format!(
        "sessions: {}  total: {}\n",
        detail.sessions(),
        format_duration(detail.total_minutes)
    ));
    for (n, entry) in detail.entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {}\n",
            n + 1,
            format_duration(entry.duration_minutes)
        ));
        if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
            out.push_str(&format!("     {note}\n"));
        }
    }
    out
}

pub fn render_shelf(records: &[ReadingRecord]) -> String {
    if records.is_empty() {
        return "Your shelf is empty. Add a book with `readtrack shelf add <book id>`.\n".into();
    }
    records
        .iter()
        .map(|r| {
            let rating = r.rating.map(|n| format!("  ({n}/5)")).unwrap_or_default();
            format!("{:>6}  {} by {}{}\n", r.id, r.book_title, r.book_author, rating)
        })
        .collect()
}

/// Runs one session: countdown, then the completion prompt.
pub async fn run_timer<R, W>(
    flow: &ReadingFlow,
    minutes: u32,
    input: R,
    out: &mut W,
) -> Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let timer = flow.timer();
    let mut lines = input.lines();
    let mut events = timer.subscribe();

    timer.select_duration(minutes).await?;
    writeln!(out, "{}", render_selection(minutes))?;
    let started = timer.start_timer().await?;
    writeln!(out, "{RUNNING_HELP}")?;
    write!(out, "\r{}", render_running(&TimerSnapshot::from(&started)))?;
    out.flush()?;

    let mut input_open = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(TimerEvent::Tick(snapshot)) | Ok(TimerEvent::StateChanged(snapshot)) => {
                    write!(out, "\r{}", render_running(&snapshot))?;
                    out.flush()?;
                }
                Ok(TimerEvent::Completed(_)) => break,
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("timer view skipped {skipped} events");
                    if timer.get_state().await.status == TimerStatus::Completed {
                        break;
                    }
                }
                Err(RecvError::Closed) => bail!("timer stopped unexpectedly"),
            },
            line = lines.next_line(), if input_open => match line? {
                Some(command) => match command.trim() {
                    "p" => {
                        if let Err(err) = timer.pause_timer().await {
                            writeln!(out, "\n{err}")?;
                        }
                    }
                    "r" => {
                        if let Err(err) = timer.resume_timer().await {
                            writeln!(out, "\n{err}")?;
                        }
                    }
                    "x" | "q" => {
                        flow.reset().await?;
                        writeln!(out, "\nSession stopped; nothing recorded.")?;
                        return Ok(SessionOutcome::Cancelled);
                    }
                    "" => {}
                    other => writeln!(out, "\nunknown command `{other}`; {RUNNING_HELP}")?,
                },
                None => {
                    input_open = false;
                    if timer.get_state().await.status == TimerStatus::Paused {
                        flow.reset().await?;
                        writeln!(out, "\nInput closed while paused; session stopped.")?;
                        return Ok(SessionOutcome::Cancelled);
                    }
                }
            }
        }
    }

    capture_completion(flow, &mut lines, out).await
}

async fn capture_completion<R, W>(
    flow: &ReadingFlow,
    lines: &mut tokio::io::Lines<R>,
    out: &mut W,
) -> Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(capture) = flow.capture().await {
        writeln!(out, "\n\n{}", render_capture(&capture))?;
    }

    loop {
        writeln!(
            out,
            "Add a note (up to {NOTE_MAX_CHARS} characters), or leave empty:"
        )?;
        out.flush()?;
        let Some(note) = lines.next_line().await? else {
            flow.skip().await?;
            return Ok(SessionOutcome::Skipped);
        };
        if flow.edit_note(&note).await? {
            writeln!(out, "Note shortened to {NOTE_MAX_CHARS} characters.")?;
        }

        loop {
            write!(out, "[s] save  [k] skip  [e] edit note: ")?;
            out.flush()?;
            let Some(choice) = lines.next_line().await? else {
                flow.skip().await?;
                return Ok(SessionOutcome::Skipped);
            };
            match choice.trim() {
                "s" => match flow.save().await {
                    Ok(receipt) => {
                        writeln!(out, "Saved reading record #{}.", receipt.id)?;
                        return Ok(SessionOutcome::Saved(receipt));
                    }
                    Err(err) => writeln!(out, "{err}. Press s to try again.")?,
                },
                "k" => {
                    flow.skip().await?;
                    writeln!(out, "Skipped; nothing recorded.")?;
                    return Ok(SessionOutcome::Skipped);
                }
                "e" => break,
                _ => {}
            }
        }
    }
}
