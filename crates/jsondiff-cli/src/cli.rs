use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jsondiff_types::{CompareContext, CompareMode};

#[derive(Parser)]
#[command(
    name = "jsondiff",
    about = "Structural JSON comparison with path-level matchers",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity: -v for debug, -vv for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two JSON documents
    Compare(CompareArgs),
    /// List registered matcher names
    Matchers,
}

#[derive(Args)]
pub struct CompareArgs {
    /// The expected document
    pub expected: PathBuf,
    /// The actual document
    pub actual: PathBuf,

    /// Rule file (.yaml, .yml, .json or .toml)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Policy preset: STRICT, LENIENT, NON_EXTENSIBLE or STRICT_ORDER
    #[arg(long, conflicts_with = "rules")]
    pub mode: Option<CompareMode>,

    /// Allow extra object keys and array elements in the actual document
    #[arg(long, num_args = 0..=1, default_missing_value = "true", conflicts_with = "rules")]
    pub extensible: Option<bool>,

    /// Compare arrays position by position
    #[arg(long, num_args = 0..=1, default_missing_value = "true", conflicts_with = "rules")]
    pub strict_order: Option<bool>,

    /// Skip expected values that are null
    #[arg(long, num_args = 0..=1, default_missing_value = "true", conflicts_with = "rules")]
    pub ignore_null: Option<bool>,

    /// Stop at the first difference
    #[arg(long, num_args = 0..=1, default_missing_value = "true", conflicts_with = "rules")]
    pub fast_fail: Option<bool>,

    /// Also print positional document paths for each difference
    #[arg(long, conflicts_with = "rules")]
    pub absolute: bool,
}

impl CompareArgs {
    /// The preset (or the default policy) with explicit flags applied.
    pub fn policy(&self) -> CompareContext {
        let base = self.mode.map(CompareContext::from).unwrap_or_default();
        CompareContext {
            extensible: self.extensible.unwrap_or(base.extensible),
            strict_order: self.strict_order.unwrap_or(base.strict_order),
            ignore_null: self.ignore_null.unwrap_or(base.ignore_null),
            fast_fail: self.fast_fail.unwrap_or(base.fast_fail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare_args(argv: &[&str]) -> CompareArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Compare(args) => args,
            Command::Matchers => panic!("expected compare"),
        }
    }

    #[test]
    fn flags_override_the_preset() {
        let args = compare_args(&[
            "jsondiff", "compare", "e.json", "a.json", "--mode", "lenient", "--fast-fail",
            "--extensible=false",
        ]);
        assert_eq!(
            args.policy(),
            CompareContext::from(CompareMode::Lenient)
                .with_fast_fail(true)
                .with_extensible(false)
        );
    }

    #[test]
    fn default_policy_without_flags() {
        let args = compare_args(&["jsondiff", "compare", "e.json", "a.json"]);
        assert_eq!(args.policy(), CompareContext::default());
        assert!(!args.absolute);
    }

    #[test]
    fn policy_flags_conflict_with_rules() {
        assert!(Cli::try_parse_from([
            "jsondiff", "compare", "e.json", "a.json", "--rules", "r.yaml", "--mode", "strict",
        ])
        .is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["jsondiff", "-vv", "matchers", "--format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
