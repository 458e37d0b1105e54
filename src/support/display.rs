use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::api::types::{Choice, VoteStats};

pub const BAR_WIDTH: usize = 40;

/// Percent labels are only drawn inside segments wider than this share.
const LABEL_THRESHOLD: f64 = 15.0;

pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// `dd/mm/YYYY HH:MM:SS`, the way French locales print a date and time.
pub fn format_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn choice_badge(choice: Choice) -> String {
    match choice {
        Choice::Oui => format!("[+] {}", choice.label()),
        Choice::Non => format!("[-] {}", choice.label()),
    }
}

/// Draws the oui/non split as a fixed-width bar. Whatever the server left unassigned stays dotted.
pub fn progress_bar(stats: &VoteStats, width: usize) -> String {
    if stats.total == 0 {
        return "·".repeat(width);
    }

    let oui_len = segment_len(stats.oui_percentage, width).min(width);
    let non_len = segment_len(stats.non_percentage, width).min(width - oui_len);
    let rest = width - oui_len - non_len;

    let mut bar = String::with_capacity(width * 3);
    bar.push_str(&segment('█', oui_len, label_for(stats, Choice::Oui)));
    bar.push_str(&segment('▒', non_len, label_for(stats, Choice::Non)));
    bar.push_str(&"·".repeat(rest));
    bar
}

fn segment_len(percentage: f64, width: usize) -> usize {
    if !percentage.is_finite() || percentage <= 0.0 {
        return 0;
    }
    (percentage / 100.0 * width as f64).round() as usize
}

fn label_for(stats: &VoteStats, choice: Choice) -> Option<String> {
    let percentage = stats.percentage(choice);
    if stats.count(choice) > 0 && percentage > LABEL_THRESHOLD {
        Some(format_percentage(percentage))
    } else {
        None
    }
}

fn segment(fill: char, len: usize, label: Option<String>) -> String {
    let label = match label {
        Some(v) if v.chars().count() + 2 <= len => v,
        _ => return fill.to_string().repeat(len),
    };

    let label_len = label.chars().count();
    let left = (len - label_len) / 2;
    let right = len - label_len - left;

    format!(
        "{}{}{}",
        fill.to_string().repeat(left),
        label,
        fill.to_string().repeat(right)
    )
}
