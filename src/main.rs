use clap::{Parser, Subcommand};
use pagemill::{config, output, pipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagemill")]
#[command(about = "Static blog build pipeline: markdown in, routed pages out")]
#[command(long_about = "\
Static blog build pipeline: markdown in, routed pages out

Your filesystem is the data source. Markdown files become content nodes,
every node gains a derived route slug, and a query over the node set
materializes one page per document plus a root listing page.

Content structure:

  content/
  ├── config.toml              # Site config (optional)
  ├── posts/
  │   ├── first-post.md        # → /blog/posts/first-post/
  │   └── second-post.md       # → /blog/posts/second-post/
  └── notes/
      └── index.md             # index stem → /blog/notes/

Front matter (optional `---` fenced key: value block) supplies title, date,
and anything else; the date field orders the root listing. The root route /
is rendered with the landing layout, every other page with the default
layout.

Run 'pagemill gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → derive → materialize → render
    Build,
    /// Validate content and routes without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            println!("==> Building {}", cli.source.display());
            let report = pipeline::build(&cli.source, &cli.output, &config)?;
            output::print_build_output(&report, &cli.output);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let report = pipeline::check(&cli.source, &config)?;
            output::print_check_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
