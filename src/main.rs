use anyhow::{Context, Result};
use attrition_dash::cli::{Args, OutputFormat};
use attrition_dash::{filter_options, to_csv_string, write_csv_file, AppState, ReportOptions};
use clap::Parser;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut state = AppState::new(&args.data);
    let dataset = match state.dataset() {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load dataset: {e}");
            return Err(e).context("loading employee data");
        }
    };

    let options = filter_options(&dataset);
    if args.list_options {
        println!("Departments: {}", join(&options.departments));
        println!("Genders:     {}", join(&options.genders));
        match options.age_range {
            Some(range) => println!("Age range:   {} - {}", range.min, range.max),
            None => println!("Age range:   (no Age column)"),
        }
        return Ok(());
    }

    let spec = args.filter_spec(options.age_range);
    let view = state.set_filter(spec)?;
    log::info!("{} of {} employees match the filter", view.len(), dataset.len());

    if let Some(n) = args.preview {
        print!("{}", to_csv_string(&view.head(n))?);
        println!();
    }

    if let Some(path) = &args.export {
        write_csv_file(view, path)
            .with_context(|| format!("exporting filtered rows to {}", path.display()))?;
    }

    let report = state.report(&ReportOptions { bins: args.bins })?;
    match args.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn join(values: &std::collections::BTreeSet<String>) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
