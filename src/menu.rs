//! Console menu and the interactive parameter editor.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::automation::config::{
    CPS_RANGE, Config, MIN_COLOR_VARIANCE_RANGE, MIN_UNIQUE_COLORS_RANGE, ParamError,
};

/// Main menu entries, numbered as shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Calibrate,
    TestDetection,
    Start,
    EditParameters,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Calibrate),
            "2" => Some(MenuChoice::TestDetection),
            "3" => Some(MenuChoice::Start),
            "4" => Some(MenuChoice::EditParameters),
            "5" => Some(MenuChoice::Quit),
            _ => None,
        }
    }

    /// Options that operate on the canvas and need a calibrated rect.
    pub fn needs_canvas(&self) -> bool {
        matches!(self, MenuChoice::TestDetection | MenuChoice::Start)
    }
}

pub fn print_menu<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "=== Main Menu ===")?;
    writeln!(writer, "1. Configure canvas area")?;
    writeln!(writer, "2. Test detection")?;
    writeln!(writer, "3. Start clicker")?;
    writeln!(writer, "4. Edit parameters")?;
    writeln!(writer, "5. Quit")?;
    Ok(())
}

/// Prints `text` and reads one trimmed line. `None` means end of input.
pub fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    text: &str,
) -> Result<Option<String>> {
    write!(writer, "{}", text)?;
    writer.flush()?;

    let mut line = String::new();
    let read = reader.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Applies one edited field. Empty input keeps the current value.
fn apply_field(
    input: &str,
    setter: impl FnOnce(&str) -> Result<(), ParamError>,
) -> bool {
    if input.is_empty() {
        return false;
    }
    match setter(input) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    }
}

/// Walks the user through every tunable parameter.
///
/// Invalid entries are reported and the previous value is kept; the editor
/// moves on to the next field either way. Returns the number of fields
/// that changed. End of input stops the editor early.
pub fn edit_parameters<R: BufRead, W: Write>(
    config: &mut Config,
    reader: &mut R,
    writer: &mut W,
) -> Result<usize> {
    let mut changed = 0;

    writeln!(writer)?;
    writeln!(writer, "=== Configuration ===")?;

    writeln!(
        writer,
        "Current CPS: {} clicks/sec (delay {:.3}s)",
        config.clicks_per_second,
        config.click_delay_secs()
    )?;
    let text = format!(
        "New CPS ({}-{}) [{}]: ",
        CPS_RANGE.0, CPS_RANGE.1, config.clicks_per_second
    );
    let Some(input) = prompt(reader, writer, &text)? else {
        return Ok(changed);
    };
    if apply_field(&input, |s| config.set_clicks_per_second(s)) {
        log::info!(
            "CPS set: {} clicks/s (delay: {:.3}s)",
            config.clicks_per_second,
            config.click_delay_secs()
        );
        changed += 1;
    }

    writeln!(writer, "Current pixel size: {:.4} px", config.cell_size)?;
    let Some(custom) = prompt(reader, writer, "Custom size? (y/n) [n]: ")? else {
        return Ok(changed);
    };
    if custom.eq_ignore_ascii_case("y") {
        let text = format!("New size [{:.4}]: ", config.cell_size);
        let Some(input) = prompt(reader, writer, &text)? else {
            return Ok(changed);
        };
        if apply_field(&input, |s| config.set_cell_size(s)) {
            changed += 1;
        }
    }

    writeln!(writer, "Min unique colors: {}", config.min_unique_colors)?;
    let text = format!(
        "New minimum ({}-{}) [{}]: ",
        MIN_UNIQUE_COLORS_RANGE.0, MIN_UNIQUE_COLORS_RANGE.1, config.min_unique_colors
    );
    let Some(input) = prompt(reader, writer, &text)? else {
        return Ok(changed);
    };
    if apply_field(&input, |s| config.set_min_unique_colors(s)) {
        changed += 1;
    }

    writeln!(writer, "Min variance: {}", config.min_color_variance)?;
    let text = format!(
        "New variance ({}-{}) [{}]: ",
        MIN_COLOR_VARIANCE_RANGE.0, MIN_COLOR_VARIANCE_RANGE.1, config.min_color_variance
    );
    let Some(input) = prompt(reader, writer, &text)? else {
        return Ok(changed);
    };
    if apply_field(&input, |s| config.set_min_color_variance(s)) {
        changed += 1;
    }

    let text = format!("Scan interval [{}s]: ", config.scan_interval_secs);
    let Some(input) = prompt(reader, writer, &text)? else {
        return Ok(changed);
    };
    if apply_field(&input, |s| config.set_scan_interval(s)) {
        changed += 1;
    }

    log::info!("Configuration updated ({} changed)", changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn edit(config: &mut Config, input: &str) -> (usize, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let changed = edit_parameters(config, &mut reader, &mut output).unwrap();
        (changed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Calibrate));
        assert_eq!(MenuChoice::parse(" 3\n"), Some(MenuChoice::Start));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_needs_canvas() {
        assert!(MenuChoice::TestDetection.needs_canvas());
        assert!(MenuChoice::Start.needs_canvas());
        assert!(!MenuChoice::Calibrate.needs_canvas());
        assert!(!MenuChoice::EditParameters.needs_canvas());
    }

    #[test]
    fn test_edit_all_fields() {
        let mut config = Config::default();
        let (changed, _) = edit(&mut config, "10\ny\n30.5\n3\n25\n5\n");

        assert_eq!(changed, 5);
        assert_eq!(config.clicks_per_second, 10.0);
        assert_eq!(config.cell_size, 30.5);
        assert_eq!(config.min_unique_colors, 3);
        assert_eq!(config.min_color_variance, 25.0);
        assert_eq!(config.scan_interval_secs, 5.0);
    }

    #[test]
    fn test_empty_input_keeps_values() {
        let mut config = Config::default();
        let (changed, output) = edit(&mut config, "\nn\n\n\n\n");

        assert_eq!(changed, 0);
        assert_eq!(config, Config::default());
        assert!(output.contains("New CPS (0.1-100) [20]: "));
        assert!(output.contains("delay 0.050s"));
        assert!(!output.contains("New size"));
    }

    #[test]
    fn test_invalid_entries_keep_values_and_continue() {
        let mut config = Config::default();
        let (changed, _) = edit(&mut config, "500\ny\n-3\nabc\n60\n12\n");

        assert_eq!(changed, 1);
        assert_eq!(config.clicks_per_second, 20.0);
        assert_eq!(config.cell_size, 41.07);
        assert_eq!(config.min_unique_colors, 4);
        assert_eq!(config.min_color_variance, 20.0);
        assert_eq!(config.scan_interval_secs, 12.0);
    }

    #[test]
    fn test_end_of_input_stops_early() {
        let mut config = Config::default();
        let (changed, _) = edit(&mut config, "50\n");

        assert_eq!(changed, 1);
        assert_eq!(config.clicks_per_second, 50.0);
        assert_eq!(config.min_unique_colors, 4);
    }

    #[test]
    fn test_prompt_reads_trimmed_line() {
        let mut reader = Cursor::new(b"  2  \n".to_vec());
        let mut output = Vec::new();
        let line = prompt(&mut reader, &mut output, "Your choice: ").unwrap();
        assert_eq!(line.as_deref(), Some("2"));
        assert_eq!(output, b"Your choice: ");

        assert_eq!(prompt(&mut reader, &mut output, "> ").unwrap(), None);
    }
}
