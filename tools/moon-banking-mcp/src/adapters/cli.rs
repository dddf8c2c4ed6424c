use clap::Parser;
use std::ffi::OsString;

use crate::shared::selection::ToolSelection;

// Flags clap handles itself; every other argument is set aside.
const RECOGNIZED: [&str; 5] = ["--tool", "--help", "-h", "--version", "-V"];

#[derive(Debug, Parser)]
#[command(
    name = "moon-banking-mcp",
    version,
    about = "MCP stdio server exposing read-only Moon Banking API queries"
)]
pub struct Cli {
    /// Expose only the named tool; repeat to expose several.
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,
}

impl Cli {
    /// Parse argv, returning the arguments that were ignored.
    pub fn parse_lenient<I, T>(args: I) -> Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (recognized, ignored) = split_args(args);
        let cli = Self::try_parse_from(recognized)?;
        Ok((cli, ignored))
    }

    pub fn selection(&self) -> ToolSelection {
        ToolSelection::from_names(self.tools.iter().map(String::as_str))
    }
}

fn split_args<I, T>(args: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut recognized: Vec<OsString> = args.next().into_iter().collect();
    let mut ignored = Vec::new();
    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        if text == "--tool" {
            recognized.push(arg);
            recognized.extend(args.next());
        } else if text.starts_with("--tool=") || RECOGNIZED.contains(&text.as_str()) {
            recognized.push(arg);
        } else {
            ignored.push(text);
        }
    }
    (recognized, ignored)
}
