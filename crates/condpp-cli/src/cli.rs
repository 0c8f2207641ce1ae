use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use condpp_core::{parse_define, CondppConfig, Environment};

/// Build the `condpp` argument parser
pub fn build_command() -> Command {
    Command::new("condpp")
        .version(condpp_core::VERSION)
        .about("Strip disabled //#if branches from source files")
        .arg(
            Arg::new("inputs")
                .value_name("INPUT")
                .help("Source files or directories to preprocess")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .long("define")
                .value_name("KEY=VALUE")
                .help("Define a variable for predicates (bare KEY means true)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("no-process-env")
                .long("no-process-env")
                .help("Do not import process environment variables")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Output directory; required for directories and multiple inputs")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("source-map")
                .long("source-map")
                .help("Write a Source Map v3 file next to every output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sources-content")
                .long("sources-content")
                .help("Embed the original text in emitted source maps")
                .requires("source-map")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ext")
                .long("ext")
                .value_name("EXT")
                .help("File extension to pick up when walking directories (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("flatten")
                .long("flatten")
                .help("Write directory outputs without mirroring the input tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub inputs: Vec<PathBuf>,
    pub defines: Vec<(String, String)>,
    pub use_process_env: bool,
    pub out_dir: Option<PathBuf>,
    pub source_map: bool,
    pub sources_content: bool,
    pub extensions: Vec<String>,
    pub flatten: bool,
    pub debug: bool,
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let defines = matches
            .get_many::<String>("define")
            .into_iter()
            .flatten()
            .map(|definition| parse_define(definition))
            .collect::<Result<Vec<_>>>()?;

        let options = Self {
            inputs: matches
                .get_many::<PathBuf>("inputs")
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            defines,
            use_process_env: !matches.get_flag("no-process-env"),
            out_dir: matches.get_one::<PathBuf>("out-dir").cloned(),
            source_map: matches.get_flag("source-map"),
            sources_content: matches.get_flag("sources-content"),
            extensions: matches
                .get_many::<String>("ext")
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            flatten: matches.get_flag("flatten"),
            debug: matches.get_flag("debug"),
        };

        if options.out_dir.is_none() && options.source_map {
            return Err(anyhow!("--source-map requires --out-dir"));
        }

        Ok(options)
    }

    /// Parse an argument list, program name first
    pub fn try_parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    /// Process variables (unless disabled) overlaid with `-D` definitions
    pub fn environment(&self) -> Environment {
        let base = if self.use_process_env {
            Environment::from_process()
        } else {
            Environment::new()
        };
        base.merge(Environment::from_pairs(self.defines.iter().cloned()))
    }

    pub fn config(&self) -> CondppConfig {
        let mut config = CondppConfig {
            emit_source_maps: self.source_map,
            include_sources_content: self.sources_content,
            preserve_structure: !self.flatten,
            debug: self.debug,
            ..Default::default()
        };
        if !self.extensions.is_empty() {
            config.source_extensions = self.extensions.clone();
        }
        config
    }
}
