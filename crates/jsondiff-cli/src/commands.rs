use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use jsondiff_core::{compare, resolve_absolute_paths, CompareResult, Customizations, MatcherRegistry};
use jsondiff_rules::{run_rules, RuleOutcome, RuleReport, RuleSet};
use jsondiff_types::Value;

use crate::cli::*;
use crate::render::{render_failure, render_resolved};

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Compare(args) => cmd_compare(args, cli.format),
        Command::Matchers => cmd_matchers(cli.format),
    }
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    text.parse::<Value>()
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let expected = load_document(&args.expected)?;
    let actual = load_document(&args.actual)?;

    if let Some(rules_path) = &args.rules {
        let rules = RuleSet::from_path(rules_path)?;
        let report = run_rules(&expected, &actual, &rules, MatcherRegistry::global())?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_rule_report(&report),
        }
        return Ok(exit_code(report.passed()));
    }

    let policy = args.policy();
    tracing::debug!(?policy, "comparing without rules");
    let result = compare(&expected, &actual, policy, Customizations::new());

    match format {
        OutputFormat::Json if args.absolute => {
            let paths = resolve_absolute_paths(&result, &expected, &actual);
            let doc = serde_json::json!({
                "report": result.to_report(),
                "absolutePaths": paths,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result.to_report())?),
        OutputFormat::Text => {
            let resolved = args
                .absolute
                .then(|| resolve_absolute_paths(&result, &expected, &actual));
            for (i, failure) in result.failures().iter().enumerate() {
                print!("{}", render_failure(failure));
                if let Some(entry) = resolved.as_ref().and_then(|paths| paths.entries.get(i)) {
                    print!("{}", render_resolved(entry));
                }
            }
            print_summary(result.passed(), result.len());
        }
    }
    Ok(exit_code(result.passed()))
}

fn print_rule_report(report: &RuleReport) {
    let mut differences = 0;
    for outcome in &report.outcomes {
        match outcome {
            RuleOutcome::Compared {
                rule,
                json_path,
                result,
            } => {
                print_rule_header(*rule, json_path, result);
                for failure in result.failures() {
                    print!("{}", render_failure(failure));
                }
                differences += result.len();
            }
            RuleOutcome::Unmatched { rule, .. } => {
                for entry in outcome.entries() {
                    println!("{} {}", format!("rule {rule}").bold(), entry.reason.red());
                }
                differences += 1;
            }
        }
    }
    print_summary(report.passed(), differences);
}

fn print_rule_header(rule: usize, json_path: &str, result: &CompareResult) {
    let status = if result.passed() {
        "ok".green()
    } else {
        format!("{} difference(s)", result.len()).red()
    };
    println!("{} {} {}", format!("rule {rule}").bold(), json_path.cyan(), status);
}

fn print_summary(passed: bool, differences: usize) {
    if passed {
        println!("{} Documents match.", "✓".green().bold());
    } else {
        println!("{} {differences} difference(s) found.", "✗".red().bold());
    }
}

fn cmd_matchers(format: OutputFormat) -> anyhow::Result<ExitCode> {
    let names = MatcherRegistry::global().names();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            for name in &names {
                println!("  {}", name.cyan());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn args(expected: PathBuf, actual: PathBuf) -> CompareArgs {
        CompareArgs {
            expected,
            actual,
            rules: None,
            mode: None,
            extensible: None,
            strict_order: None,
            ignore_null: None,
            fast_fail: None,
            absolute: false,
        }
    }

    #[test]
    fn equal_documents_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let e = write(&dir, "e.json", r#"{"a":[1,2]}"#);
        let a = write(&dir, "a.json", r#"{"a":[1,2],"b":1}"#);
        let code = cmd_compare(args(e, a), OutputFormat::Json).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn differences_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let e = write(&dir, "e.json", r#"{"a":1}"#);
        let a = write(&dir, "a.json", r#"{"a":2}"#);
        let mut compare_args = args(e, a);
        compare_args.absolute = true;
        let code = cmd_compare(compare_args, OutputFormat::Text).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn rule_files_drive_the_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let e = write(&dir, "e.json", r#"{"ts":1,"v":1.0}"#);
        let a = write(&dir, "a.json", r#"{"ts":2,"v":1.004}"#);
        let rules = write(
            &dir,
            "rules.yaml",
            "- mode: STRICT\n  preProcess:\n    - action: removeNode\n      path: $.ts\n  customRules:\n    - name: TolerantValue\n      jsonPath: v\n      param: 0.01\n",
        );
        let mut compare_args = args(e, a);
        compare_args.rules = Some(rules);
        assert_eq!(cmd_compare(compare_args, OutputFormat::Text).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn unreadable_or_invalid_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.json", "{not json");
        let good = write(&dir, "good.json", "{}");
        assert!(cmd_compare(args(bad, good.clone()), OutputFormat::Text).is_err());
        assert!(cmd_compare(args(dir.path().join("absent.json"), good), OutputFormat::Text).is_err());
    }
}
