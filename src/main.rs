use clap::Parser;
use log::debug;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use pipesh::shell::Shell;
use pipesh::utils::config::Config;
use pipesh::utils::log::init_logger;

/// A small shell with pipes, redirections, subshells and && / || / ; / & chaining
#[derive(Parser, Debug)]
#[command(name = "pipesh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run one command line and exit with its status
    #[arg(short = 'c', value_name = "COMMAND")]
    command: Option<String>,

    /// Script to run line by line
    #[arg(conflicts_with = "command")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = Config::new();
    init_logger(&config);
    debug!("配置加载成功 {}", config.config_dir.display());

    let mut shell = Shell::new(&config);
    let code = match (args.command, args.script) {
        (Some(line), _) => shell.run_line(&line).code(),
        (None, Some(script)) => {
            let source = fs::read_to_string(&script)
                .map_err(|e| format!("{}: {}", script.display(), e))?;
            shell.run_script(&source)
        }
        (None, None) => shell.run_interactive()?,
    };
    process::exit(code)
}
