use std::time::Duration;

use clap::Parser;

use super::render::RenderArgs;

#[derive(Parser, Debug)]
#[command(name = "run", about = "🛰️ Run one rank of a multi-process render.", long_about = None)]
pub struct RunCommand {
    /// 🔢 Rank of this process; 0 is the coordinator
    #[arg(short, long, value_name = "RANK")]
    pub rank: u32,

    /// 📌 Coordinator address
    ///
    /// Rank 0 listens on it, every other rank connects to it.
    #[arg(short, long, value_name = "ADDRESS", default_value = "127.0.0.1:8787")]
    pub address: String,

    /// 🔌 Connection attempts before a worker gives up on the coordinator
    #[arg(long, value_name = "COUNT", default_value_t = 50)]
    pub connect_attempts: u32,

    /// Milliseconds between connection attempts
    #[arg(long, value_name = "MILLIS", default_value_t = 100)]
    pub connect_interval: u64,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl RunCommand {
    pub fn connect_interval(&self) -> Duration {
        Duration::from_millis(self.connect_interval)
    }
}
