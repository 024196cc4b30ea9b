use aud::cli::{Args, Command};
use aud::config::{self, WriterConfig};
use aud::entities::{self, Emit, Stage};
use aud::{sample, scene};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use std::io::Write;
use std::path::Path;

fn init_logging(args: &Args) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn write_stage(stage: &Stage, output: &Path) -> Result<()> {
    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(stage.to_usda().as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }
    let written = stage.save(output)?;
    info!("Wrote {}", written.display());
    println!("{}", written.display());
    Ok(())
}

fn print_schema(type_tag: Option<&str>) -> Result<()> {
    let Some(type_tag) = type_tag else {
        for schema in entities::CATALOG {
            let base = schema.base.map(|b| b.name).unwrap_or("-");
            match schema.type_tag {
                Some(tag) => println!("{:<14} (base: {})", tag, base),
                None => println!("{:<14} (abstract, base: {})", schema.name, base),
            }
        }
        return Ok(());
    };

    let Some(schema) = entities::schema_for(type_tag) else {
        bail!("Unknown prim type: {type_tag} (run `aud schema` for the list)");
    };

    let mut node = entities::Node::from_schema(schema, "example");
    for (name, def) in entities::defaults_for(type_tag) {
        match def.default {
            Some(value) => {
                node.set_attribute(name, value.to_value());
            }
            None => {
                println!("# {} {} (no default)", def.as_type, name);
            }
        }
    }
    for line in node.attributes.values().flat_map(|a| a.lines(0)) {
        println!("{line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();
    init_logging(&args)?;

    info!("aud {} starting", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let writer_config = WriterConfig::discover(args.config.clone())?;

    match &args.command {
        Command::Sample { output } => {
            let stage = sample::build_sample(writer_config)?;
            write_stage(&stage, output)?;
        }
        Command::Convert { scene: scene_path, output } => {
            let desc = scene::load_scene(scene_path)?;
            let stage = scene::build_stage(&desc, writer_config)
                .with_context(|| format!("Failed to convert {}", scene_path.display()))?;
            let output = output
                .clone()
                .unwrap_or_else(|| scene_path.with_extension(entities::keys::USDA_EXT));
            write_stage(&stage, &output)?;
        }
        Command::Schema { type_tag } => print_schema(type_tag.as_deref())?,
    }
    Ok(())
}
