//! Logger setup.
//!
//! Every record goes to stdout and is appended to
//! `<exe_dir>/logs/wplace_touchup.log` with a millisecond timestamp.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const LOG_FILE_NAME: &str = "wplace_touchup.log";

/// Writes each buffer to stdout and, when available, to the log file.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            // best effort
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn open_log_file(dir: &Path) -> Option<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .ok()
}

/// Formats one record as `[HH:MM:SS.mmm LEVEL] message`.
pub fn format_line(level: log::Level, args: &std::fmt::Arguments<'_>) -> String {
    format!("[{} {:<5}] {}", Local::now().format("%H:%M:%S%.3f"), level, args)
}

/// Initializes the global logger. Level defaults to `info`, `RUST_LOG` overrides it.
pub fn init_logger() {
    let sink = TeeWriter {
        file: open_log_file(&crate::paths::get_logs_dir()),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(sink)))
        .format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())))
        .init();
}

/// Routes panics through the logger so they land in the log file too.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log::error!("[PANIC]{} {}", location, msg);
        eprintln!("[PANIC]{} {}", location, msg);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_has_level_and_message() {
        let line = format_line(log::Level::Warn, &format_args!("scan took {}ms", 12));
        assert!(line.starts_with('['));
        assert!(line.contains("WARN"));
        assert!(line.ends_with("scan took 12ms"));
    }

    #[test]
    fn test_tee_writer_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = TeeWriter {
            file: open_log_file(dir.path()),
        };
        writer.write_all(b"first\n").unwrap();
        writer.write_all(b"second\n").unwrap();
        writer.flush().unwrap();

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
