// 💬 Line Prompt - plain stdin/stdout session
//
// Used when the terminal UI is compiled out, and by the one-shot
// `calc` / `history` subcommands for their output.

use crate::history::{HistoryFilter, HistoryRecord, HistoryStore};
use crate::letters::LetterMap;
use crate::service::{NumerologyService, Submission};
use std::io::{self, BufRead, Write};

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// Run the prompt loop until a quit word or end of input.
///
/// Besides names it understands `/history` and `/table`.
pub fn run<S, R, W>(service: &mut NumerologyService<S>, mut input: R, mut out: W) -> io::Result<()>
where
    S: HistoryStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "🔢 Numerology Calculator")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "Enter names to calculate their numerology values.")?;
    writeln!(out, "Type /history to see past results, /table for the letter table,")?;
    writeln!(out, "'quit' or 'exit' to stop.\n")?;

    // Decoded lossily: invalid UTF-8 becomes U+FFFD, which compute rejects
    let mut buf = Vec::new();
    loop {
        write!(out, "Enter a name: ")?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(out)?;
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let entry = line.trim();
        if QUIT_WORDS.contains(&entry.to_lowercase().as_str()) {
            writeln!(out, "\nThank you for using the Numerology Calculator! 👋")?;
            break;
        }

        match entry {
            "/history" => match service.history(&HistoryFilter::new()) {
                Ok(records) => write_history(&mut out, &records)?,
                Err(e) => writeln!(out, "⚠️  {}\n", e)?,
            },
            "/table" => write_table(&mut out, service.calculator().letter_map())?,
            _ => match service.submit(entry) {
                Ok(submission) => write_submission(&mut out, &submission)?,
                Err(e) => writeln!(out, "❌ Error: {}\n", e)?,
            },
        }
    }

    Ok(())
}

pub fn write_submission<W: Write>(out: &mut W, submission: &Submission) -> io::Result<()> {
    let result = &submission.result;

    writeln!(out, "\n📊 Results for '{}':", result.name.trim())?;
    write!(out, "   Numerology Value: {}", result.value)?;
    if result.is_master {
        write!(out, " (Master Number)")?;
    }
    writeln!(out)?;
    if let Some(meaning) = result.meaning() {
        writeln!(out, "   Meaning: {}", meaning)?;
    }
    writeln!(out, "   Calculation: {}", result.breakdown())?;
    if !result.reductions.is_empty() {
        writeln!(out, "   Reduced: {}", result.reduction_path())?;
    }

    if let Some(previous) = &submission.previous {
        writeln!(
            out,
            "   ℹ️  '{}' was already calculated on {}",
            previous.name.trim(),
            previous.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    if let Some(warning) = &submission.storage_warning {
        writeln!(out, "   ⚠️  Not saved to history: {}", warning)?;
    }

    writeln!(out, "{}", "-".repeat(50))
}

/// Records are written in the order given (callers pass newest first).
pub fn write_history<W: Write>(out: &mut W, records: &[HistoryRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No calculation history yet.\n");
    }

    writeln!(out, "\n{:<20}  {:>5}  Name", "Date", "Value")?;
    writeln!(out, "{}", "-".repeat(50))?;
    for record in records {
        writeln!(
            out,
            "{:<20}  {:>5}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.result,
            record.name.trim()
        )?;
    }
    writeln!(out)
}

pub fn write_table<W: Write>(out: &mut W, map: &LetterMap) -> io::Result<()> {
    writeln!(out)?;
    for (digit, letters) in map.groups() {
        let names: Vec<String> = letters.iter().map(|l| l.to_string()).collect();
        writeln!(out, "   {:<9} = {}", names.join(", "), digit)?;
    }
    writeln!(out)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;

    fn session(input: &str) -> (String, NumerologyService<MemoryStore>) {
        let mut service = NumerologyService::new(MemoryStore::new());
        let mut out = Vec::new();
        run(&mut service, input.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), service)
    }

    #[test]
    fn test_calculates_and_quits() {
        let (out, service) = session("John\nquit\n");
        assert!(out.contains("Results for 'John'"));
        assert!(out.contains("Numerology Value: 2"));
        assert!(out.contains("J=1 + O=6 + H=8 + N=5 = 20"));
        assert!(out.contains("Reduced: 20 → 2"));
        assert!(out.contains("Thank you"));
        assert_eq!(service.store().list().unwrap().len(), 1);
    }

    #[test]
    fn test_errors_keep_session_alive() {
        let (out, service) = session("\nJ0HN\nRRRB\n");
        assert!(out.contains("Error: Please enter a name"));
        assert!(out.contains("Error: Only letters A-Z"));
        assert!(out.contains("Numerology Value: 11 (Master Number)"));
        assert_eq!(service.store().list().unwrap().len(), 1);
    }

    #[test]
    fn test_history_command_newest_first() {
        let (out, _) = session("John\nRRRB\n/history\nexit\n");
        let history = out.split("Value  Name").nth(1).unwrap();
        let rrrb = history.find("RRRB").unwrap();
        let john = history.find("John").unwrap();
        assert!(rrrb < john);
    }

    #[test]
    fn test_empty_history_and_table() {
        let (out, _) = session("/history\n/table\n");
        assert!(out.contains("No calculation history yet."));
        assert!(out.contains("A, J, S"));
        assert!(out.contains("I, R"));
    }

    #[test]
    fn test_non_utf8_line_rejected_session_continues() {
        let mut service = NumerologyService::new(MemoryStore::new());
        let mut out = Vec::new();
        run(&mut service, &b"J\xffHN\nJohn\n"[..], &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Error: Only letters A-Z"));
        assert!(out.contains("Results for 'John'"));
        assert_eq!(service.store().list().unwrap().len(), 1);
    }

    #[test]
    fn test_repeat_name_noted() {
        let (out, _) = session("Mary\nmary\n");
        assert!(out.contains("'Mary' was already calculated"));
    }
}
