// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;
use pose_overlay::cli::Cli;

fn main() {
    let cli = Cli::parse();
    pose_overlay::cli::run::run(&cli);
}
