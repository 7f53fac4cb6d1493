use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;

use crate::shell::executor::{abort_on, Executor, Outcome};
use crate::shell::parser::parse;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::path;
use crate::utils::theme::Theme;

/// Status of a line that failed to parse.
pub const SYNTAX_ERROR_STATUS: i32 = 2;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    executor: Executor,
    last_status: i32,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            theme: Theme::load_theme(&config.theme),
            executor: Executor::new(),
            last_status: 0,
        }
    }

    /// Parses and runs one line. A parse error runs nothing and yields
    /// status 2; a fatal executor error aborts the process.
    pub fn run_line(&mut self, line: &str) -> Outcome {
        debug!("执行命令: {}", line);
        let list = match parse(line) {
            Ok(list) => list,
            Err(e) => {
                warn!("语法错误: {}", e);
                eprintln!("{}: syntax error: {}", self.config.name, e);
                self.last_status = SYNTAX_ERROR_STATUS;
                return Outcome::Completed(SYNTAX_ERROR_STATUS);
            }
        };

        match self.executor.run(&list) {
            Ok(outcome) => {
                self.last_status = outcome.code();
                outcome
            }
            Err(e) => abort_on(&e),
        }
    }

    /// Runs a script line by line, skipping blank lines and `#` comments.
    /// Stops at the first `exit`.
    pub fn run_script(&mut self, source: &str) -> i32 {
        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Outcome::Exit(code) = self.run_line(line) {
                return code;
            }
        }
        self.last_status
    }

    pub fn run_interactive(&mut self) -> Result<i32, Box<dyn Error>> {
        debug!("初始化 pipesh...");
        let mut readline = ReadlineManager::new(self.config)?;
        readline.load_history();
        debug!("pipesh 准备就绪...");

        let code = self.run_loop(&mut readline)?;
        readline.save_history();

        debug!("退出 pipesh...");
        Ok(code)
    }

    fn run_loop(&mut self, readline: &mut ReadlineManager) -> Result<i32, Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = self.theme.prompt(&path::prompt_dir(), self.last_status);

            match readline.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    readline.add_history(&line)?;
                    if let Outcome::Exit(code) = self.run_line(&line) {
                        debug!("exit 请求, 状态码 {}", code);
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("接收到中断信号...");
                }
                Err(ReadlineError::Eof) => {
                    debug!("接收到 EOF 信号，退出 pipesh...");
                    return Ok(self.last_status);
                }
                Err(err) => {
                    error!("发生错误: {}", err);
                    eprintln!("{}: {}", (self.theme.error_style)("error".to_string()), err);
                    return Ok(self.last_status);
                }
            }
        }
    }
}
