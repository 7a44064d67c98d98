use crate::geometry::{Size, TargetRect};
use crate::types::Side;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Guidepost - guided tours for a terminal operations console
#[derive(Parser, Debug)]
#[command(name = "guidepost")]
#[command(about = "Terminal operations console with guided tours and onboarding flows")]
#[command(version)]
pub struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Completion state file; overrides the config file
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Flow catalog file; the built-in catalog is used when omitted
    #[arg(long, global = true)]
    pub flows: Option<PathBuf>,

    /// Keep completion state in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Log file for the interactive console
    #[arg(long, global = true, default_value = "guidepost.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive console (default)
    Run,
    /// Inspect or export flow catalogs
    Flows {
        #[command(subcommand)]
        action: FlowCommands,
    },
    /// Show completed and pending flows
    Status,
    /// Forget every completed flow
    Reset,
    /// Compute a callout position without launching the console
    Place {
        /// Target rectangle as top,left,width,height
        #[arg(long, value_parser = parse_rect)]
        target: TargetRect,
        /// Callout size as width,height
        #[arg(long, value_parser = parse_size)]
        callout: Size,
        /// Viewport size as width,height
        #[arg(long, value_parser = parse_size)]
        viewport: Size,
        /// Preferred side (top, bottom, left, right, center)
        #[arg(long, default_value = "bottom")]
        side: Side,
    },
}

#[derive(Subcommand, Debug)]
pub enum FlowCommands {
    /// List the flows of the active catalog
    List,
    /// Validate a flow catalog file
    Validate {
        /// Path to the catalog to validate
        path: PathBuf,
    },
    /// Write the active catalog to a file
    Export {
        /// Destination path
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// True when the interactive console will take over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Run))
    }
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[i32; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, value));
    }
    let mut numbers = [0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a whole number", part))?;
    }
    Ok(numbers)
}

fn parse_rect(value: &str) -> Result<TargetRect, String> {
    let [top, left, width, height] = parse_numbers::<4>(value)?;
    if width < 0 || height < 0 {
        return Err("width and height must not be negative".to_string());
    }
    Ok(TargetRect::new(top, left, width, height))
}

fn parse_size(value: &str) -> Result<Size, String> {
    let [width, height] = parse_numbers::<2>(value)?;
    if width <= 0 || height <= 0 {
        return Err("width and height must be positive".to_string());
    }
    Ok(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        // Running with no args launches the console
        let cli = Cli::try_parse_from(["guidepost"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_interactive());
        assert_eq!(cli.log_file, PathBuf::from("guidepost.log"));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "guidepost",
            "status",
            "--state-file",
            "/tmp/tours.json",
            "--ephemeral",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Status)));
        assert_eq!(cli.state_file, Some(PathBuf::from("/tmp/tours.json")));
        assert!(cli.ephemeral);
        assert!(!cli.is_interactive());
    }

    #[test]
    fn test_cli_flows_validate() {
        let cli = Cli::try_parse_from(["guidepost", "flows", "validate", "catalog.json"]).unwrap();
        match cli.command {
            Some(Commands::Flows {
                action: FlowCommands::Validate { path },
            }) => assert_eq!(path, PathBuf::from("catalog.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_place() {
        let cli = Cli::try_parse_from([
            "guidepost",
            "place",
            "--target",
            "100,100,50,20",
            "--callout",
            "200,80",
            "--viewport",
            "1000,800",
            "--side",
            "right",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Place {
                target,
                callout,
                viewport,
                side,
            }) => {
                assert_eq!(target, TargetRect::new(100, 100, 50, 20));
                assert_eq!(callout, Size::new(200, 80));
                assert_eq!(viewport, Size::new(1000, 800));
                assert_eq!(side, Side::Right);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_place_rejects_bad_geometry() {
        let result = Cli::try_parse_from([
            "guidepost",
            "place",
            "--target",
            "1,2,3",
            "--callout",
            "10,10",
            "--viewport",
            "80,24",
        ]);
        assert!(result.is_err());
        assert!(parse_size("0,5").is_err());
        assert!(parse_rect("1, 2, x, 4").is_err());
    }
}
