use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use memdump::{Category, CategorySet, Selection};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List running processes as `pid - name - state`
    Show,

    /// Dump the memory map of a process, grouped by region kind
    Dump(DumpArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["pid", "maps_file"])))]
#[command(group(ArgGroup::new("sections").required(true).multiple(true).args(["section", "all"])))]
pub struct DumpArgs {
    /// Process ID to inspect
    pub pid: Option<i32>,

    /// Read a saved maps file instead of a live process
    #[arg(long, value_name = "PATH")]
    pub maps_file: Option<PathBuf>,

    /// Section(s) to show; repeat or separate with commas
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub section: Vec<SectionArg>,

    /// Show every section
    #[arg(short, long)]
    pub all: bool,

    /// Print per-section counts after the listing
    #[arg(long)]
    pub summary: bool,
}

impl DumpArgs {
    pub fn selection(&self) -> Selection {
        if self.all {
            return Selection::All;
        }
        let set: CategorySet = self.section.iter().map(|s| Category::from(*s)).collect();
        Selection::Only(set)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SectionArg {
    Executable,
    SharedLibs,
    Heap,
    Stack,
    Vvar,
    Vsyscall,
    Vdso,
    #[value(alias = "none")]
    Anonymous,
}

impl From<SectionArg> for Category {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Executable => Category::Executable,
            SectionArg::SharedLibs => Category::SharedLibrary,
            SectionArg::Heap => Category::Heap,
            SectionArg::Stack => Category::Stack,
            SectionArg::Vvar => Category::Vvar,
            SectionArg::Vsyscall => Category::Vsyscall,
            SectionArg::Vdso => Category::Vdso,
            SectionArg::Anonymous => Category::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}
