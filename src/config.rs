use serde::Serialize;
use std::path::PathBuf;

/// 运行配置 (由命令行参数构造)
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub template: PathBuf,
    pub tasks: PathBuf,
    pub outputs: PathBuf,
    pub port: u16,
    /// Tasks rendered per page.
    pub batch_size: usize,
    pub static_dir: Option<PathBuf>,
    pub quit_on_done: bool,
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: PathBuf::from("template.html"),
            tasks: PathBuf::from("tasks.csv"),
            outputs: PathBuf::from("outputs.csv"),
            port: 4321,
            batch_size: 1,
            static_dir: None,
            quit_on_done: false,
            open_browser: true,
        }
    }
}

impl Config {
    pub fn url(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }
}
