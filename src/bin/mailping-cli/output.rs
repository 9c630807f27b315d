#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
use mailping_lib::{MxRecord, PingResult, ResultCode};

/// One report line, whatever the subcommand.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct OutputRow {
    pub email: String,
    pub valid: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub completed: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub code: Option<ResultCode>,
    pub message: String,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub mx: Vec<MxRecord>,
}

impl OutputRow {
    pub fn from_ping(result: PingResult) -> Self {
        Self {
            message: result.code.message().to_string(),
            email: result.email,
            valid: result.valid,
            completed: Some(result.completed),
            code: Some(result.code),
            mx: Vec::new(),
        }
    }

    pub fn syntax(email: &str, valid: bool) -> Self {
        let (code, message) = if valid {
            (None, "Valid email syntax".to_string())
        } else {
            let code = ResultCode::InvalidSyntax;
            (Some(code), code.message().to_string())
        };
        Self {
            email: email.to_string(),
            valid,
            completed: None,
            code,
            message,
            mx: Vec::new(),
        }
    }

    /// `valid` means at least one exchanger was found.
    pub fn mx(email: &str, code: ResultCode, message: String, mx: Vec<MxRecord>) -> Self {
        Self {
            email: email.to_string(),
            valid: code == ResultCode::ValidDomain,
            completed: None,
            code: Some(code),
            message,
            mx,
        }
    }

    /// Flags SMTP outcomes that ended before a verdict.
    fn status_suffix(&self) -> &'static str {
        if self.completed == Some(false) {
            " (inconclusive)"
        } else {
            ""
        }
    }

    #[cfg_attr(not(feature = "with-csv"), allow(dead_code))]
    fn code_str(&self) -> &'static str {
        self.code.map(ResultCode::as_str).unwrap_or("")
    }

    fn mx_summary(&self, separator: &str) -> String {
        self.mx
            .iter()
            .map(|record| format!("{} {}", record.preference, record.exchange))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.valid)
}

fn write_human(rows: &[OutputRow]) -> Result<()> {
    for row in rows {
        if row.valid {
            println!("[OK]      {}", row.email);
        } else {
            println!("[INVALID] {}", row.email);
        }
        let suffix = row.status_suffix();
        match row.code {
            Some(code) => println!("        {}: {}{suffix}", code.as_str(), row.message),
            None => println!("        {}{suffix}", row.message),
        }
        if !row.mx.is_empty() {
            println!("        mx: {}", row.mx_summary(", "));
        }
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buf, row)?;
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

// email, valid, completed, code, message, mx
#[cfg(feature = "with-csv")]
fn csv_record(row: &OutputRow) -> [String; 6] {
    [
        row.email.clone(),
        row.valid.to_string(),
        row.completed.map(|c| c.to_string()).unwrap_or_default(),
        row.code_str().to_string(),
        row.message.clone(),
        row.mx_summary("|"),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
