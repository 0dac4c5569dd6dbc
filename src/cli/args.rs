// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about = "Overlay pose skeletons from job outputs onto video frames")]
#[command(after_help = r"Examples:
    pose-overlay kitchen_videos pose_run
    pose-overlay kitchen_videos pose_run --out-dir renders --verbose false")]
pub struct Cli {
    /// Dataset name within the job database
    pub dataset_name: String,

    /// Job name whose outputs to visualize
    pub job_name: String,

    /// Output directory for annotated frames
    #[arg(long, default_value = "imgs")]
    pub out_dir: String,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_args() {
        let cli = Cli::parse_from(["pose-overlay", "kitchen_videos", "pose_run"]);
        assert_eq!(cli.dataset_name, "kitchen_videos");
        assert_eq!(cli.job_name, "pose_run");
        assert_eq!(cli.out_dir, "imgs");
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["pose-overlay", "only_dataset"]).is_err());
        assert!(Cli::try_parse_from(["pose-overlay"]).is_err());
    }

    #[test]
    fn test_extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["pose-overlay", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_custom_out_dir() {
        let cli = Cli::parse_from([
            "pose-overlay",
            "dataset",
            "job",
            "--out-dir",
            "renders",
            "--verbose",
            "false",
        ]);
        assert_eq!(cli.out_dir, "renders");
        assert!(!cli.verbose);
    }
}
