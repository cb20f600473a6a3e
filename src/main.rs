use anyhow::Result;
use clap::Parser;
use fixmap::cli::{Cli, Commands};
use fixmap::config::ScanConfig;
use fixmap::io::output::{create_file_writer, create_writer, OutputWriter};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            format,
            output,
            extensions,
            exclude,
            max_file_size,
            jobs,
        } => {
            if let Some(jobs) = jobs {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs.min(num_cpus::get()))
                    .build_global()?;
            }

            let mut config = ScanConfig::discover(&path)?;
            if let Some(extensions) = extensions {
                config.include_extensions = extensions;
            }
            if let Some(exclude) = exclude {
                config.exclude_dirs = exclude;
            }
            if let Some(max_file_size) = max_file_size {
                config.max_file_size = max_file_size;
            }

            let report = fixmap::scan(&path, &config)?;

            let mut writer = match output {
                Some(out) => create_file_writer(format.into(), &out)?,
                None => create_writer(format.into()),
            };
            writer.write_report(&report)?;
            Ok(())
        }
    }
}
