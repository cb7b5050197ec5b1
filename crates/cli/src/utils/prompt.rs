//! Interactive prompting for values the command line left out

use anyhow::{Context, Result, bail};
use mpi_runner_core::{Error, MethodCatalog, MethodRole, ProcessCount};
use std::io::{BufRead, Write};

pub trait Prompter {
    /// Ask for free text. `None` means the input is closed.
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Pick one of `options`, returning its index
    fn choose(&mut self, message: &str, options: &[String]) -> Result<usize>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

/// Prompts on a writer (stderr by default) and reads answers line by line
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read answer")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Prompter on the terminal
pub fn stdin_prompter() -> LinePrompter<std::io::StdinLock<'static>, std::io::Stderr> {
    LinePrompter::new(std::io::stdin().lock(), std::io::stderr())
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(d) => write!(self.output, "{message} [{d}]: ")?,
            None => write!(self.output, "{message}: ")?,
        }
        self.output.flush()?;

        Ok(self.read_line()?.map(|answer| match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer,
        }))
    }

    fn choose(&mut self, message: &str, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            bail!("Nothing to choose from");
        }
        writeln!(self.output, "{message}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }

        loop {
            write!(self.output, "Choice [1-{}]: ", options.len())?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                bail!("No choice made");
            };
            // Accept either the number or the exact name
            if let Some(index) = answer
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=options.len()).contains(n))
                .map(|n| n - 1)
                .or_else(|| options.iter().position(|o| *o == answer))
            {
                return Ok(index);
            }
            writeln!(self.output, "❌ '{answer}' is not one of the listed choices")?;
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        write!(self.output, "{message} [{hint}]: ")?;
        self.output.flush()?;
        Ok(match self.read_line()?.as_deref().map(str::to_ascii_lowercase) {
            Some(ref a) if a == "y" || a == "yes" => true,
            Some(ref a) if a == "n" || a == "no" => false,
            _ => default,
        })
    }
}

/// Resolve a process count from the command line, or prompt until a valid
/// integer is entered.
pub fn resolve_process_count(
    prompter: &mut dyn Prompter,
    explicit: Option<&str>,
    default: Option<ProcessCount>,
    label: &str,
) -> Result<ProcessCount> {
    if let Some(raw) = explicit {
        return Ok(ProcessCount::parse(raw)?);
    }

    let default = default.map(|d| d.to_string());
    loop {
        let message = format!(
            "Number of processes for {label} ({}-{})",
            ProcessCount::MIN,
            ProcessCount::MAX
        );
        let Some(answer) = prompter.text(&message, default.as_deref())? else {
            bail!("No process count given for {label}");
        };
        match ProcessCount::parse(&answer) {
            Ok(count) => return Ok(count),
            Err(Error::InvalidProcessCount(_)) => {
                eprintln!("❌ '{answer}' is not a whole number, try again");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Use the named method, or ask the user to pick one from the catalog
pub fn resolve_method(
    prompter: &mut dyn Prompter,
    catalog: &MethodCatalog,
    role: MethodRole,
    explicit: Option<String>,
) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name);
    }
    let names: Vec<String> = catalog
        .methods(role)
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    let index = prompter.choose(&format!("Select a {} method:", role.label()), &names)?;
    Ok(names[index].clone())
}
