use clap::Parser;

use super::render::RenderArgs;

#[derive(Parser, Debug)]
#[command(name = "local", about = "🏠 Run every rank inside this process.", long_about = None)]
pub struct LocalCommand {
    #[command(flatten)]
    pub render: RenderArgs,
}
