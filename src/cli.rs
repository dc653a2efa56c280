//! Command-line surface: the stable token set the orchestrator recognizes
//! (spec §6 "CLI surface").

const USAGE: &str = "\
llmstxt-forge [site] [options]

Crawls configured documentation sites into a structural page index and
emits llms.txt grounding bundles.

Arguments:
  [site]                 Run a single configured site; omit to run all sites.

Options:
  --force, --force-reindex   Bypass existing-index reuse (forces a full re-crawl).
  --output <path>            Override the canonical index output path.
  -h, --help                 Print this help text and exit.
";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cli {
    pub site: Option<String>,
    pub force: bool,
    pub output: Option<String>,
    pub help: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("--output requires a path argument")]
    MissingOutputValue,
    #[error("unexpected extra positional argument: {0}")]
    ExtraPositional(String),
}

pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, CliError> {
    let mut cli = Cli::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => cli.help = true,
            "--force" | "--force-reindex" => cli.force = true,
            "--output" => {
                let value = iter.next().ok_or(CliError::MissingOutputValue)?;
                cli.output = Some(value);
            }
            other if other.starts_with('-') => {
                return Err(CliError::UnknownOption(other.to_string()));
            }
            other => {
                if cli.site.is_some() {
                    return Err(CliError::ExtraPositional(other.to_string()));
                }
                cli.site = Some(other.to_string());
            }
        }
    }

    Ok(cli)
}

pub fn usage() -> &'static str {
    USAGE
}

#[derive(Debug, Clone, Copy)]
pub struct EnvFlags {
    pub ci: bool,
    pub compact_index: bool,
    pub debug_crawl: bool,
}

/// Read the environment variables of spec §6: `CI`/`GITHUB_ACTIONS`,
/// `NODE_ENV`/`MINIFY_INDEX`, `DEBUG_CRAWL`.
pub fn read_env_flags() -> EnvFlags {
    EnvFlags {
        ci: matches!(std::env::var("CI"), Ok(v) if v == "true")
            || matches!(std::env::var("GITHUB_ACTIONS"), Ok(v) if v == "true"),
        compact_index: matches!(std::env::var("NODE_ENV"), Ok(v) if v == "production")
            || matches!(std::env::var("MINIFY_INDEX"), Ok(v) if v == "true"),
        debug_crawl: matches!(std::env::var("DEBUG_CRAWL"), Ok(v) if v == "true"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_site_and_force() {
        let cli = parse(args(&["docs", "--force"])).unwrap();
        assert_eq!(cli.site, Some("docs".to_string()));
        assert!(cli.force);
    }

    #[test]
    fn parses_force_reindex_alias() {
        let cli = parse(args(&["--force-reindex"])).unwrap();
        assert!(cli.force);
        assert!(cli.site.is_none());
    }

    #[test]
    fn parses_output_path() {
        let cli = parse(args(&["--output", "/tmp/index.json"])).unwrap();
        assert_eq!(cli.output, Some("/tmp/index.json".to_string()));
    }

    #[test]
    fn help_flag_short_and_long() {
        assert!(parse(args(&["-h"])).unwrap().help);
        assert!(parse(args(&["--help"])).unwrap().help);
    }

    #[test]
    fn rejects_unknown_option() {
        assert!(matches!(
            parse(args(&["--bogus"])),
            Err(CliError::UnknownOption(_))
        ));
    }

    #[test]
    fn rejects_second_positional() {
        assert!(matches!(
            parse(args(&["docs", "other"])),
            Err(CliError::ExtraPositional(_))
        ));
    }

    #[test]
    fn output_without_value_errors() {
        assert!(matches!(
            parse(args(&["--output"])),
            Err(CliError::MissingOutputValue)
        ));
    }
}
