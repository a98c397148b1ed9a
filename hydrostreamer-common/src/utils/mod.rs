use std::time::Instant;

pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}

/// Prints the boxed welcome banner shown by each tool in verbose mode.
pub fn print_welcome(tool_name: &str) {
    let powered_by = "* Powered by HydroStreamer";
    let welcome = format!("* Welcome to {}", tool_name);
    let width = welcome.len().max(powered_by.len()) + 2;
    println!("{}", "*".repeat(width));
    println!("{}{}*", welcome, " ".repeat(width - 1 - welcome.len()));
    println!("{}{}*", powered_by, " ".repeat(width - 1 - powered_by.len()));
    println!("{}", "*".repeat(width));
}

/// Tracks percentage progress and reports only when the whole-number
/// percentage changes.
pub struct Progress {
    total: usize,
    old_progress: usize,
}

impl Progress {
    pub fn new(total: usize) -> Progress {
        Progress {
            total,
            old_progress: usize::MAX,
        }
    }

    /// Returns the new percentage after `done` items, if it changed.
    pub fn update(&mut self, done: usize) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let progress = (100.0_f64 * done as f64 / self.total as f64) as usize;
        if progress != self.old_progress {
            self.old_progress = progress;
            return Some(progress);
        }
        None
    }
}
