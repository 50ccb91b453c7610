use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

use crate::core::config::LoggingConfig;

#[derive(Clone)]
pub(crate) struct LogMakeWriter {
    pub file: Option<Arc<Mutex<File>>>,
    /// Off while an interactive prompt owns the terminal.
    pub echo_stderr: bool,
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: self.file.clone(),
            echo_stderr: self.echo_stderr,
        }
    }
}

pub(crate) struct LogWriter {
    file: Option<Arc<Mutex<File>>>,
    echo_stderr: bool,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(file) = &self.file {
            let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
            file.write_all(buf)?;
        }
        if self.echo_stderr {
            std::io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = &self.file {
            file.lock().unwrap_or_else(|e| e.into_inner()).flush()?;
        }
        if self.echo_stderr {
            std::io::stderr().flush()?;
        }
        Ok(())
    }
}

pub(crate) fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

/// Installs the global subscriber. Interactive sessions only log to the file.
pub(crate) fn init(config: &LoggingConfig, interactive: bool) -> Result<()> {
    let file = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Arc::new(Mutex::new(file)))
        }
        None => None,
    };
    let make_writer = LogMakeWriter {
        file,
        echo_stderr: !interactive,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.level))
        .with_ansi(false)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Already set in tests
    Ok(())
}
