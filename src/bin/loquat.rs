use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use loquat::template::{AssetResolver, NoAssets};
use loquat::{DirectoryAssets, RenderOptions, Renderer, TemplateData, extract_placeholders};
use tracing::info;


#[derive(Parser)]
#[clap(name = "loquat", version, about = "Fill placeholders in PowerPoint templates")]
struct Opts {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the placeholders of a template as JSON
    Extract {
        template: PathBuf,
    },

    /// Render a template with JSON data
    Render {
        template: PathBuf,

        /// JSON object mapping placeholder names to values
        #[clap(short = 'd', long = "data")]
        data: PathBuf,

        /// Directory image keys are resolved against
        #[clap(short = 'a', long = "assets")]
        assets: Option<PathBuf>,

        /// YAML render options
        #[clap(short = 'c', long = "config")]
        config: Option<PathBuf>,

        #[clap(short = 'o', long = "output")]
        output: PathBuf,

        /// Print the render report as JSON
        #[clap(long = "report")]
        report: bool,
    },
}


fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    match opts.command {
        Command::Extract { template } => {
            let bytes = std::fs::read(&template)?;
            let placeholders = extract_placeholders(&bytes)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &placeholders)?;
            writeln!(out)?;
        },
        Command::Render { template, data, assets, config, output, report } => {
            let bytes = std::fs::read(&template)?;
            let data = TemplateData::from_json_reader(std::fs::File::open(&data)?)?;
            let options = match config {
                Some(path) => RenderOptions::from_yaml_file(path)?,
                None => RenderOptions::default(),
            };

            let directory;
            let resolver: &dyn AssetResolver = match assets {
                Some(root) => {
                    directory = DirectoryAssets::new(root);
                    &directory
                },
                None => &NoAssets,
            };

            let rendered = Renderer::new(resolver)
                .with_options(options)
                .render(&bytes, &data)?;
            std::fs::write(&output, &rendered.bytes)?;
            info!(output = %output.display(), bytes = rendered.bytes.len(), "wrote presentation");

            if report {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                serde_json::to_writer_pretty(&mut out, &rendered.report)?;
                writeln!(out)?;
            }
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts: Opts = Parser::parse();
    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("loquat: {}", e);
            ExitCode::FAILURE
        },
    }
}
