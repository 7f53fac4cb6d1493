use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

pub fn parse_level(level: &str) -> LevelFilter {
    match level {
        level if level.eq_ignore_ascii_case("off") => LevelFilter::Off,
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

pub fn log_file_path(config: &Config) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    config.logger_dir.join(format!("{}_{}.log", config.name, date))
}

fn open_log_file(config: &Config) -> io::Result<File> {
    fs::create_dir_all(&config.logger_dir)?;
    File::options()
        .create(true)
        .append(true)
        .open(log_file_path(config))
}

/// Logs go to a dated file only: stdout and stderr belong to the commands.
/// Each line carries the PID, so forked children can be told apart.
pub fn init_logger(config: &Config) {
    let level = parse_level(&config.logger_level);

    let sink: Box<dyn Write + Send> = match open_log_file(config) {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };

    let init = Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .target(Target::Pipe(sink))
        .filter(Some(&config.name), level)
        .filter(None, LevelFilter::Warn)
        .try_init();

    if init.is_ok() {
        log::debug!("日志级别设置为: {}", level);
    }
}
