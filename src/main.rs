//! Command-line front end.
//!
//! ```text
//! huffpack encode <input> <output> [--config <file.json>] [--stats]
//! huffpack decode <input> <output> [--config <file.json>]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use huffpack::config::CodecConfig;
use huffpack::Codec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    stats: bool,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let mut positional: Vec<&str> = Vec::new();
        let mut config = None;
        let mut stats = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    let path = args.get(i).context("--config requires a path")?;
                    config = Some(PathBuf::from(path));
                }
                "--stats" => stats = true,
                "-h" | "--help" => bail!(usage()),
                flag if flag.starts_with("--") => bail!("unknown option: {}\n{}", flag, usage()),
                value => positional.push(value),
            }
            i += 1;
        }

        let &[mode, input, output] = positional.as_slice() else {
            bail!(usage());
        };
        let mode = match mode {
            "encode" => Mode::Encode,
            "decode" => Mode::Decode,
            other => bail!("unknown command: {}\n{}", other, usage()),
        };

        Ok(Self {
            mode,
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            config,
            stats,
        })
    }
}

fn usage() -> &'static str {
    "usage: huffpack <encode|decode> <input> <output> [--config <file.json>] [--stats]"
}

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = Args::parse(&argv)?;

    let config = match &args.config {
        Some(path) => CodecConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    let codec = Codec::new(config);

    match args.mode {
        Mode::Encode => {
            let output = codec
                .compress_file(&args.input, &args.output)
                .with_context(|| format!("encoding {}", args.input.display()))?;
            if args.stats {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Mode::Decode => {
            let len = codec
                .decompress_file(&args.input, &args.output)
                .with_context(|| format!("decoding {}", args.input.display()))?;
            if args.stats {
                println!("{}", serde_json::json!({ "restored_size": len }));
            }
        }
    }

    Ok(())
}
