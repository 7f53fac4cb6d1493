use colored::Colorize;

pub struct Theme {
    pub prompt_symbol: String,
    pub success_symbol: String,
    pub error_symbol: String,
    pub prompt_style: Box<dyn Fn(String) -> String>,
    pub dir_style: Box<dyn Fn(String) -> String>,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub success_style: Box<dyn Fn(String) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt_symbol: "$".to_string(),
            success_symbol: "♡".to_string(),
            error_symbol: "✗".to_string(),
            prompt_style: Box::new(|s: String| s.bright_cyan().to_string()),
            dir_style: Box::new(|s: String| s.bold().to_string()),
            error_style: Box::new(|s: String| s.bright_red().to_string()),
            success_style: Box::new(|s: String| s.bright_magenta().to_string()),
        }
    }
}

impl Theme {
    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "dark" => Theme {
                prompt_symbol: "➤".to_string(),
                success_symbol: "♡".to_string(),
                error_symbol: "✗".to_string(),
                prompt_style: Box::new(|s: String| s.bright_purple().to_string()),
                dir_style: Box::new(|s: String| s.blue().to_string()),
                error_style: Box::new(|s: String| s.red().to_string()),
                success_style: Box::new(|s: String| s.magenta().to_string()),
            },
            _ => Theme::default(),
        }
    }

    /// `♡ dir $ ` after a success, `✗ 1 dir $ ` after a failure.
    pub fn prompt(&self, dir: &str, last_status: i32) -> String {
        let marker = if last_status == 0 {
            (self.success_style)(self.success_symbol.clone())
        } else {
            (self.error_style)(format!("{} {}", self.error_symbol, last_status))
        };
        format!(
            "{} {} {} ",
            marker,
            (self.dir_style)(dir.to_string()),
            (self.prompt_style)(self.prompt_symbol.clone())
        )
    }
}
