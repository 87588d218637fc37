use clap::Subcommand;

use self::{local::LocalCommand, run::RunCommand};

pub mod local;
pub mod render;
pub mod run;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 🛰️ Run one rank
    ///
    /// Start a single participant of a multi-process run. Launch the same
    /// command once per rank; rank 0 listens and gathers, the others connect
    /// to it and send their rows.
    Run(RunCommand),

    /// 🏠 Run every rank locally
    ///
    /// Run all participants as tasks of this process, linked by in-memory
    /// channels instead of sockets.
    Local(LocalCommand),
}
